//! Persistence collaborator trait.

use async_trait::async_trait;

use crate::record::VaultRecord;
use vaultpass_common::{AccountId, RecordId, Result};

/// Persistence collaborator for vault records.
///
/// The core treats stored ciphertext as an opaque blob it alone can decrypt;
/// implementations must never inspect or transform it. Implementations handle
/// their own connection management and report backend failures as
/// [`vaultpass_common::Error::Storage`].
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Fetch a single record.
    ///
    /// # Errors
    /// - Record not found
    /// - Backend failure
    async fn get(&self, id: &RecordId) -> Result<VaultRecord>;

    /// List all records belonging to an account, newest first.
    async fn list(&self, owner: &AccountId) -> Result<Vec<VaultRecord>>;

    /// Insert or replace a record.
    async fn put(&self, record: VaultRecord) -> Result<()>;

    /// Delete a record.
    ///
    /// # Errors
    /// - Record not found
    async fn delete(&self, id: &RecordId) -> Result<()>;
}
