//! Encryption-at-rest for server-held secrets.
//!
//! Protects short secrets that the server must be able to read back, such as
//! a 2FA enrollment secret, under a [`ServerKey`] configured out of band.
//! This key is entirely independent of any user's vault key; a database dump
//! alone does not expose enrollment secrets.

use crate::aead;
use crate::keys::ServerKey;
use vaultpass_common::{Error, Result};

/// Encrypt a secret string under the server key.
///
/// # Errors
/// - Returns error if encryption fails
pub fn seal_secret(key: &ServerKey, secret: &str) -> Result<String> {
    aead::seal(key.as_bytes(), secret.as_bytes())
}

/// Decrypt a secret string sealed with [`seal_secret`].
///
/// # Errors
/// - [`Error::InvalidPassword`] if the authentication check fails (wrong key)
/// - [`Error::CorruptedData`] if the token or the decrypted bytes are malformed
pub fn open_secret(key: &ServerKey, sealed: &str) -> Result<String> {
    let bytes = aead::open(key.as_bytes(), sealed)?;
    String::from_utf8(bytes)
        .map_err(|_| Error::CorruptedData("Secret is not valid UTF-8".to_string()))
}
