//! Common error types for VaultPass.

use thiserror::Error;

/// Top-level error type for VaultPass operations.
///
/// Decryption failures collapse into [`Error::InvalidPassword`] at every user
/// boundary: the message carries no detail about whether the password was
/// wrong or the ciphertext was tampered with.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication failed while decrypting: wrong password or tampered data.
    #[error("Invalid password")]
    InvalidPassword,

    /// Ciphertext or payload is structurally malformed.
    ///
    /// Rendered to users with the same generic message as a wrong password;
    /// the detail is for operator diagnosis only.
    #[error("Corrupted data: {0}")]
    CorruptedData(String),

    /// The cached unlock passed its deadline.
    #[error("Session expired")]
    SessionExpired,

    /// One or more records could not be re-encrypted; nothing was changed.
    #[error("Re-encryption failed for {failed} records")]
    ReencryptionFailed {
        failed: usize,
        reasons: Vec<String>,
    },

    /// Session storage is missing or blocked; the vault stays locked.
    #[error("Session storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Cryptographic operation failed.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Persistence operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not permitted.
    #[error("Not permitted: {0}")]
    NotPermitted(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
