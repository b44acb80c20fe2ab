//! Key types with secure memory handling.
//!
//! All key types automatically zeroize their memory on drop to prevent
//! sensitive data from persisting in memory.

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use vaultpass_common::{Error, Result};

/// Length of encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Vault encryption key derived from the master password and account identifier.
///
/// Never persisted; recomputed on demand from its inputs.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Create a derived key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.key.ct_eq(&other.key).into()
    }
}

impl Eq for DerivedKey {}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey([REDACTED])")
    }
}

/// Ephemeral key protecting the cached master password in session storage.
///
/// Lives only as long as the browser session and is destroyed on lock.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    key: [u8; KEY_LENGTH],
}

impl SessionKey {
    /// Generate a random session key.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut key = [0u8; KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut key);
        Self { key }
    }

    /// Create a session key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionKey([REDACTED])")
    }
}

/// Server-held key for secrets encrypted at rest (e.g. 2FA enrollment secrets).
///
/// Configured out of band as a hex string; independent of any user's vault key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ServerKey {
    key: [u8; KEY_LENGTH],
}

impl ServerKey {
    /// Generate a random server key, for provisioning.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut key = [0u8; KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut key);
        Self { key }
    }

    /// Parse a server key from its hex configuration form.
    ///
    /// # Errors
    /// - Returns error if the string is not 64 hex characters
    pub fn from_hex(encoded: &str) -> Result<Self> {
        let bytes = hex::decode(encoded)
            .map_err(|e| Error::InvalidInput(format!("Invalid server key encoding: {}", e)))?;
        let key: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| {
            Error::InvalidInput(format!("Server key must be {} bytes", KEY_LENGTH))
        })?;
        Ok(Self { key })
    }

    /// Encode the key as hex for configuration storage.
    pub fn to_hex(&self) -> String {
        hex::encode(self.key)
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for ServerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServerKey([REDACTED])")
    }
}

/// The user's master password while held in memory.
///
/// Never persisted or logged; zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterPassword(String);

impl MasterPassword {
    /// Wrap a password string.
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Get the password string.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for MasterPassword {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for MasterPassword {}

impl fmt::Debug for MasterPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterPassword([REDACTED])")
    }
}
