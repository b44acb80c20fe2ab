//! Zero-knowledge vault engine for VaultPass.
//!
//! This module provides:
//! - The strict [`VaultItemPayload`] schema and its authenticated cipher
//! - Session-scoped caching of the master password behind an ephemeral key
//! - The vault session state machine with inactivity expiry
//! - All-or-nothing re-encryption for master password changes
//!
//! # Architecture
//! The vault module sits between the application surface and the persistence
//! collaborator. Plaintext payloads and the master password exist only in
//! memory, only while a session is unlocked; persisted ciphertext is opaque
//! to every other component.

pub mod cipher;
pub mod clock;
pub mod config;
pub mod identity;
pub mod keystore;
pub mod payload;
pub mod policy;
pub mod reencrypt;
pub mod session;

pub use cipher::{decrypt_item, encrypt_item};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SessionConfig;
pub use identity::AccountIdentity;
pub use keystore::{CachedUnlock, SessionKeyStore};
pub use payload::VaultItemPayload;
pub use reencrypt::{change_master_password, ReencryptionCoordinator, SelfEntryPredicate};
pub use session::{SessionState, VaultSession};
