//! Authenticated encryption using XChaCha20-Poly1305.
//!
//! Output is a single opaque token: a version tag followed by the
//! base64-encoded nonce and ciphertext. Decryption with the wrong key fails
//! the Poly1305 check and surfaces as [`Error::InvalidPassword`]; a token
//! whose structure cannot be parsed at all surfaces as
//! [`Error::CorruptedData`]. Callers never see which cipher-level condition
//! occurred beyond that split.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::{
    aead::{generic_array::GenericArray, Aead, AeadCore, KeyInit, OsRng},
    XChaCha20Poly1305,
};

use crate::keys::KEY_LENGTH;
use vaultpass_common::{Error, Result};

/// Nonce size for XChaCha20-Poly1305 (24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Authentication tag size (16 bytes).
pub const TAG_SIZE: usize = 16;

/// Version tag prefixed to every token.
///
/// Lets the primitive be swapped later without touching the storage schema.
pub const TOKEN_VERSION: &str = "v1";

/// Encrypt plaintext into a versioned opaque token.
///
/// # Postconditions
/// - Returns `"v1." + base64(nonce || ciphertext || tag)`
/// - The nonce is randomly generated per call
///
/// # Errors
/// - Returns error if encryption fails
pub fn seal(key: &[u8; KEY_LENGTH], plaintext: &[u8]) -> Result<String> {
    let cipher = XChaCha20Poly1305::new(GenericArray::from_slice(key));
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| Error::Crypto(format!("Encryption failed: {}", e)))?;

    let mut body = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    body.extend_from_slice(&nonce);
    body.extend_from_slice(&ciphertext);

    Ok(format!("{}.{}", TOKEN_VERSION, STANDARD.encode(body)))
}

/// Decrypt a versioned opaque token.
///
/// # Errors
/// - [`Error::CorruptedData`] if the token structure is malformed or the
///   version tag is unknown
/// - [`Error::InvalidPassword`] if the authentication check fails
pub fn open(key: &[u8; KEY_LENGTH], token: &str) -> Result<Vec<u8>> {
    let body = token
        .strip_prefix(TOKEN_VERSION)
        .and_then(|rest| rest.strip_prefix('.'))
        .ok_or_else(|| Error::CorruptedData("Unsupported ciphertext version".to_string()))?;

    let bytes = STANDARD
        .decode(body)
        .map_err(|_| Error::CorruptedData("Ciphertext is not valid base64".to_string()))?;

    if bytes.len() < NONCE_SIZE + TAG_SIZE {
        return Err(Error::CorruptedData("Ciphertext too short".to_string()));
    }

    let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_SIZE);
    let nonce = GenericArray::from_slice(nonce_bytes);

    let cipher = XChaCha20Poly1305::new(GenericArray::from_slice(key));

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| Error::InvalidPassword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let key = [42u8; KEY_LENGTH];
        let plaintext = b"Hello, encrypted world!";

        let token = seal(&key, plaintext).unwrap();
        let decrypted = open(&key, &token).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_token_carries_version_tag() {
        let key = [42u8; KEY_LENGTH];
        let token = seal(&key, b"data").unwrap();
        assert!(token.starts_with("v1."));
    }

    #[test]
    fn test_different_nonce_each_time() {
        let key = [42u8; KEY_LENGTH];
        let t1 = seal(&key, b"same plaintext").unwrap();
        let t2 = seal(&key, b"same plaintext").unwrap();
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_wrong_key_fails_cleanly() {
        let token = seal(&[1u8; KEY_LENGTH], b"secret").unwrap();
        let err = open(&[2u8; KEY_LENGTH], &token).unwrap_err();
        assert!(matches!(err, Error::InvalidPassword));
    }

    #[test]
    fn test_unknown_version_is_corrupted_data() {
        let key = [42u8; KEY_LENGTH];
        let err = open(&key, "v9.AAAA").unwrap_err();
        assert!(matches!(err, Error::CorruptedData(_)));
    }

    #[test]
    fn test_malformed_base64_is_corrupted_data() {
        let key = [42u8; KEY_LENGTH];
        let err = open(&key, "v1.!!not-base64!!").unwrap_err();
        assert!(matches!(err, Error::CorruptedData(_)));
    }

    #[test]
    fn test_truncated_body_is_corrupted_data() {
        let key = [42u8; KEY_LENGTH];
        let err = open(&key, &format!("v1.{}", STANDARD.encode([0u8; 8]))).unwrap_err();
        assert!(matches!(err, Error::CorruptedData(_)));
    }

    #[test]
    fn test_single_bit_flip_is_detected() {
        let key = [42u8; KEY_LENGTH];
        let token = seal(&key, b"tamper target").unwrap();

        let mut bytes = STANDARD.decode(token.strip_prefix("v1.").unwrap()).unwrap();
        for i in 0..bytes.len() {
            bytes[i] ^= 0x01;
            let tampered = format!("v1.{}", STANDARD.encode(&bytes));
            assert!(open(&key, &tampered).is_err(), "bit flip at byte {} accepted", i);
            bytes[i] ^= 0x01;
        }
    }

    proptest! {
        #[test]
        fn prop_roundtrip(plaintext in proptest::collection::vec(any::<u8>(), 0..512)) {
            let key = [9u8; KEY_LENGTH];
            let token = seal(&key, &plaintext).unwrap();
            prop_assert_eq!(open(&key, &token).unwrap(), plaintext);
        }

        #[test]
        fn prop_wrong_key_never_decrypts(
            plaintext in proptest::collection::vec(any::<u8>(), 1..256),
            k1 in any::<[u8; KEY_LENGTH]>(),
            k2 in any::<[u8; KEY_LENGTH]>(),
        ) {
            prop_assume!(k1 != k2);
            let token = seal(&k1, &plaintext).unwrap();
            prop_assert!(open(&k2, &token).is_err());
        }
    }
}
