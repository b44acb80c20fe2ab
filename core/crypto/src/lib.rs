//! Cryptographic primitives for VaultPass.
//!
//! This module provides:
//! - Vault key derivation using Argon2id with the account identifier as salt material
//! - Authenticated encryption using XChaCha20-Poly1305, encoded as opaque versioned tokens
//! - Secure key management with automatic zeroization
//! - Encryption-at-rest for server-held secrets
//! - Password generation and strength scoring
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged
//! - Constant-time operations for sensitive comparisons

pub mod aead;
pub mod generator;
pub mod kdf;
pub mod keys;
pub mod secret;

pub use aead::{open, seal};
pub use generator::{generate_password, password_strength, PasswordOptions, StrengthLabel};
pub use kdf::{derive_key, KdfParams};
pub use keys::{DerivedKey, MasterPassword, ServerKey, SessionKey, KEY_LENGTH};
pub use secret::{open_secret, seal_secret};
