//! Authenticated encryption of vault item payloads.
//!
//! A decrypt is successful only when the cipher's authentication check passes
//! AND the plaintext deserializes into the strict payload schema. Every
//! authentication failure surfaces as [`Error::InvalidPassword`]; the caller
//! cannot tell a wrong password from tampered ciphertext, and must not try.

use crate::payload::VaultItemPayload;
use vaultpass_common::{Ciphertext, Error, Result};
use vaultpass_crypto::{aead, DerivedKey};

/// Encrypt a payload under a derived key into an opaque ciphertext token.
///
/// # Errors
/// - Returns error if the payload identifies nothing (no title, username,
///   or password) or cannot be serialized
pub fn encrypt_item(payload: &VaultItemPayload, key: &DerivedKey) -> Result<Ciphertext> {
    if payload.is_empty() {
        return Err(Error::InvalidInput(
            "At least a title, username, or password is required".to_string(),
        ));
    }

    let plaintext =
        serde_json::to_vec(payload).map_err(|e| Error::Serialization(e.to_string()))?;
    let token = aead::seal(key.as_bytes(), &plaintext)?;
    Ok(Ciphertext::new(token))
}

/// Decrypt an opaque ciphertext token back into a payload.
///
/// # Errors
/// - [`Error::InvalidPassword`] if the authentication check fails
/// - [`Error::CorruptedData`] if the token is malformed, or the decrypted
///   bytes do not match the payload schema
pub fn decrypt_item(ciphertext: &Ciphertext, key: &DerivedKey) -> Result<VaultItemPayload> {
    let plaintext = aead::open(key.as_bytes(), ciphertext.as_str())?;
    serde_json::from_slice(&plaintext)
        .map_err(|e| Error::CorruptedData(format!("Payload shape mismatch: {}", e)))
}
