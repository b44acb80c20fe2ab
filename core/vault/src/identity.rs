//! Account identity collaborator trait.

use async_trait::async_trait;

use vaultpass_common::{AccountId, Result};

/// Boundary to the surrounding account system.
///
/// Supplies the stable account identifier and the hashed-login-credential
/// operations. The login credential and the vault master password are
/// independent secrets even though users enter the same value for both today;
/// credential hashing itself lives outside this core.
#[async_trait]
pub trait AccountIdentity: Send + Sync {
    /// The stable identifier used as key-derivation salt material.
    fn account_id(&self) -> &AccountId;

    /// Compare a password against the stored login credential hash.
    ///
    /// # Errors
    /// - Backend failure while loading the credential
    async fn verify_credential(&self, password: &str) -> Result<bool>;

    /// Replace the stored login credential.
    ///
    /// Called only after every vault record has been re-encrypted under the
    /// new password, so the credential and the ciphertexts stay mutually
    /// consistent.
    async fn update_credential(&self, new_password: &str) -> Result<()>;
}
