//! Stored vault record shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vaultpass_common::{AccountId, Ciphertext, RecordId};

/// Category assigned when none is provided.
pub const DEFAULT_CATEGORY: &str = "general";

/// A stored credential entry: opaque ciphertext plus unencrypted metadata.
///
/// Only the cipher layer holding the correct derived key can read the
/// ciphertext. No plaintext secret field exists on this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultRecord {
    /// Server-assigned unique identifier.
    pub id: RecordId,
    /// Owning account; immutable after creation.
    pub owner_id: AccountId,
    /// Authenticated-encryption output of the serialized payload.
    pub ciphertext: Ciphertext,
    /// Unencrypted grouping label, normalized to lowercase.
    pub category: String,
    /// Unencrypted favorite flag.
    pub is_favorite: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// When the entry was last decrypted by its owner, if ever.
    pub last_accessed: Option<DateTime<Utc>>,
}

impl VaultRecord {
    /// Create a new record with a server-assigned id.
    pub fn new(owner_id: AccountId, ciphertext: Ciphertext, category: &str) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(Uuid::new_v4().to_string()).expect("uuid is never empty"),
            owner_id,
            ciphertext,
            category: normalize_category(category),
            is_favorite: false,
            created_at: now,
            updated_at: now,
            last_accessed: None,
        }
    }

    /// Copy of this record carrying replacement ciphertext.
    ///
    /// Identity and creation metadata are preserved; the modification
    /// timestamp is advanced.
    pub fn with_ciphertext(&self, ciphertext: Ciphertext) -> Self {
        Self {
            ciphertext,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Record that the owner just decrypted this entry.
    pub fn touch_accessed(&mut self) {
        self.last_accessed = Some(Utc::now());
    }
}

/// Normalize a category label: trimmed, lowercased, defaulting to "general".
pub fn normalize_category(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_lowercase()
    }
}
