//! Decrypted vault item shape.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The decrypted contents of a vault record.
///
/// Constructed transiently in memory while a valid master password is held;
/// never persisted or transmitted unencrypted. The schema is strict: payloads
/// with unknown fields fail deserialization, which the cipher layer reports
/// as corrupted data.
///
/// A title is expected for usability but not enforced here; the cipher
/// rejects only payloads where title, username, and password are all empty.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(deny_unknown_fields)]
pub struct VaultItemPayload {
    pub title: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub notes: String,
}

impl VaultItemPayload {
    /// True when the payload identifies nothing: no title, username, or password.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.username.is_empty() && self.password.is_empty()
    }
}

impl fmt::Debug for VaultItemPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultItemPayload")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("url", &self.url)
            .field("notes", &"[REDACTED]")
            .finish()
    }
}
