//! Vault key derivation using Argon2id.
//!
//! The salt is expanded deterministically from the account identifier, so the
//! same (password, identifier) pair always derives the same key. No per-item
//! or per-account salt record is stored anywhere; old ciphertexts stay
//! decryptable from the two inputs alone.

use argon2::{Algorithm, Argon2, Params, Version};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};

use crate::keys::{DerivedKey, KEY_LENGTH};
use vaultpass_common::{AccountId, Error, Result};

/// Domain label mixed into the salt expansion.
const SALT_DOMAIN: &[u8] = b"vaultpass/kdf/v1";

/// Parameters for Argon2id key derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB (e.g., 65536 = 64 MiB).
    pub memory_cost: u32,
    /// Number of iterations.
    pub time_cost: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl KdfParams {
    /// Create parameters suitable for interactive use.
    ///
    /// These parameters provide a balance between security and usability,
    /// targeting approximately 0.5-1 second of derivation time.
    pub fn interactive() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }

    /// Create moderate parameters for constrained devices and tests.
    pub fn moderate() -> Self {
        Self {
            memory_cost: 32768, // 32 MiB
            time_cost: 3,
            parallelism: 2,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::interactive()
    }
}

/// Expand the account identifier into fixed-width salt material.
///
/// Deterministic: the identifier is the only variable input.
fn salt_from_identifier(account: &AccountId) -> [u8; 32] {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(SALT_DOMAIN);
    hasher.update(account.as_str().as_bytes());

    let result = hasher.finalize();
    let mut salt = [0u8; 32];
    salt.copy_from_slice(&result);
    salt
}

/// Derive the vault encryption key from a master password and account identifier.
///
/// # Postconditions
/// - Deterministic: identical inputs always yield an identical key
/// - The key is never persisted; callers recompute it on demand
///
/// # Errors
/// - Returns error if the Argon2id parameters are invalid
///
/// # Security
/// - Password is not stored or logged
/// - An empty password derives normally; minimum-length policy is enforced
///   upstream by callers
pub fn derive_key(password: &str, account: &AccountId, params: &KdfParams) -> Result<DerivedKey> {
    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_LENGTH),
    )
    .map_err(|e| Error::Crypto(format!("Invalid KDF parameters: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let salt = salt_from_identifier(account);
    let mut key_bytes = [0u8; KEY_LENGTH];
    argon2
        .hash_password_into(password.as_bytes(), &salt, &mut key_bytes)
        .map_err(|e| Error::Crypto(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey::from_bytes(key_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str) -> AccountId {
        AccountId::new(id).unwrap()
    }

    #[test]
    fn test_derive_key_deterministic() {
        let params = KdfParams::moderate();
        let alice = account("alice@example.com");

        let key1 = derive_key("Tr0ub4dor&3", &alice, &params).unwrap();
        let key2 = derive_key("Tr0ub4dor&3", &alice, &params).unwrap();

        assert_eq!(key1, key2);
    }

    #[test]
    fn test_derive_key_different_identifier() {
        let params = KdfParams::moderate();

        let key1 = derive_key("pw", &account("alice@example.com"), &params).unwrap();
        let key2 = derive_key("pw", &account("bob@example.com"), &params).unwrap();

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_derive_key_different_password() {
        let params = KdfParams::moderate();
        let alice = account("alice@example.com");

        let key1 = derive_key("password1", &alice, &params).unwrap();
        let key2 = derive_key("password2", &alice, &params).unwrap();

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_empty_password_is_not_rejected_here() {
        // Minimum length is a policy concern for callers, not the KDF.
        let params = KdfParams::moderate();
        assert!(derive_key("", &account("alice@example.com"), &params).is_ok());
    }

    #[test]
    fn test_salt_expansion_is_stable() {
        let a = salt_from_identifier(&account("alice@example.com"));
        let b = salt_from_identifier(&account("alice@example.com"));
        let c = salt_from_identifier(&account("bob@example.com"));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
