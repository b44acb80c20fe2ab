//! Volatile per-session storage trait.

use vaultpass_common::Result;

/// Volatile key-value storage scoped to a single browser session.
///
/// Entries live only as long as the session and are gone when it ends. This
/// is the only storage surface the session key store is permitted to touch
/// for secret material, and values written here are always wrapped, never
/// cleartext. Each session gets its own instance; implementations must not
/// leak entries across sessions.
///
/// # Errors
/// All three operations fail with [`vaultpass_common::Error::StorageUnavailable`]
/// when the backing storage is missing or blocked; callers degrade to a locked
/// vault rather than proceeding without the cache.
pub trait SessionStorage: Send + Sync {
    /// Read an entry, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write an entry, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove an entry. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: SessionStorage + ?Sized> SessionStorage for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
