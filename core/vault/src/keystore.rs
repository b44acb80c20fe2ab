//! Session-scoped caching of the master password.
//!
//! The password never sits in session storage as cleartext: it is sealed
//! under a random session key that itself lives only in the same volatile
//! storage, gone when the session ends or the vault locks. The three entries
//! (wrapped password, session key, expiry marker) are cleared together;
//! leaving a subset behind is a bug this module's purge prevents.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};

use vaultpass_common::{Error, Result};
use vaultpass_crypto::{aead, MasterPassword, SessionKey, KEY_LENGTH};
use vaultpass_storage::SessionStorage;

/// Storage entry holding the sealed master password.
pub const WRAPPED_PASSWORD_KEY: &str = "vault.wrapped_password";
/// Storage entry holding the session wrapping key.
pub const SESSION_KEY_KEY: &str = "vault.session_key";
/// Storage entry holding the cache deadline in unix milliseconds.
pub const EXPIRES_AT_KEY: &str = "vault.expires_at";

/// A cached unlock restored from session storage.
pub struct CachedUnlock {
    pub password: MasterPassword,
    pub expires_at: DateTime<Utc>,
}

/// Manages the wrapped master password in volatile session storage.
///
/// This is the only component that touches session storage for secret
/// material.
pub struct SessionKeyStore<S: SessionStorage> {
    storage: S,
}

impl<S: SessionStorage> SessionKeyStore<S> {
    /// Create a key store over the session's volatile storage.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Load the session key, minting and persisting a fresh one when absent.
    ///
    /// An undecodable stored key is replaced rather than reused: whatever it
    /// once wrapped is unrecoverable anyway, and the caller is about to wrap
    /// a new value.
    fn load_or_create_key(&self) -> Result<SessionKey> {
        if let Some(encoded) = self.storage.get(SESSION_KEY_KEY)? {
            if let Some(key) = decode_session_key(&encoded) {
                return Ok(key);
            }
        }

        let key = SessionKey::generate();
        self.storage
            .set(SESSION_KEY_KEY, &STANDARD.encode(key.as_bytes()))?;
        Ok(key)
    }

    /// Seal the master password and persist it alongside its deadline.
    ///
    /// # Postconditions
    /// - Storage holds the wrapped password (with an embedded fresh nonce),
    ///   the session key, and the expiry marker
    /// - No cleartext password is written anywhere
    ///
    /// # Errors
    /// - [`Error::StorageUnavailable`] when session storage is blocked
    pub fn wrap(&self, password: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let key = self.load_or_create_key()?;
        let wrapped = aead::seal(key.as_bytes(), password.as_bytes())?;

        self.storage.set(WRAPPED_PASSWORD_KEY, &wrapped)?;
        self.storage
            .set(EXPIRES_AT_KEY, &expires_at.timestamp_millis().to_string())?;
        Ok(())
    }

    /// Restore the cached master password, if an intact cache exists.
    ///
    /// Missing or undecryptable state means "no active session": the cache is
    /// purged and `Ok(None)` is returned. Only an unavailable storage backend
    /// is an error.
    pub fn unwrap(&self) -> Result<Option<CachedUnlock>> {
        let (wrapped, encoded_key, expiry) = match (
            self.storage.get(WRAPPED_PASSWORD_KEY)?,
            self.storage.get(SESSION_KEY_KEY)?,
            self.storage.get(EXPIRES_AT_KEY)?,
        ) {
            (Some(w), Some(k), Some(e)) => (w, k, e),
            _ => return Ok(None),
        };

        let Some(key) = decode_session_key(&encoded_key) else {
            self.purge()?;
            return Ok(None);
        };

        let Some(expires_at) = parse_expiry(&expiry) else {
            self.purge()?;
            return Ok(None);
        };

        match aead::open(key.as_bytes(), &wrapped).map(String::from_utf8) {
            Ok(Ok(password)) => Ok(Some(CachedUnlock {
                password: MasterPassword::new(password),
                expires_at,
            })),
            _ => {
                self.purge()?;
                Ok(None)
            }
        }
    }

    /// Remove the wrapped password, session key, and expiry marker together.
    ///
    /// Every entry is attempted even if an earlier removal fails; the first
    /// failure is reported after all three removals have run.
    pub fn purge(&self) -> Result<()> {
        let results = [
            self.storage.remove(WRAPPED_PASSWORD_KEY),
            self.storage.remove(SESSION_KEY_KEY),
            self.storage.remove(EXPIRES_AT_KEY),
        ];
        results.into_iter().collect()
    }

    /// Direct access to the underlying session storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

fn decode_session_key(encoded: &str) -> Option<SessionKey> {
    let bytes = STANDARD.decode(encoded).ok()?;
    let key: [u8; KEY_LENGTH] = bytes.try_into().ok()?;
    Some(SessionKey::from_bytes(key))
}

fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(raw.parse::<i64>().ok()?)
}
