//! Vault session state machine.
//!
//! A session owns the master password's in-memory lifetime: unlocking caches
//! it (wrapped) for a bounded window, an inactivity deadline or an explicit
//! lock purges it, and re-entering always requires re-submitting the
//! password. One session object exists per active browser session; there are
//! no process-wide globals.

use std::sync::{Arc, Mutex as StdMutex, RwLock, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cipher;
use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::keystore::SessionKeyStore;
use vaultpass_common::{AccountId, Error, Result};
use vaultpass_crypto::{derive_key, KdfParams, MasterPassword};
use vaultpass_storage::{SessionStorage, VaultStore};

/// State of the vault session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No cached password; unlocking requires the master password.
    Locked,
    /// A submitted password is being verified.
    Unlocking,
    /// Password cached until the deadline.
    Unlocked { expires_at: DateTime<Utc> },
    /// Deadline passed; relocks automatically once the purge completes.
    Expired,
}

struct SessionInner {
    state: SessionState,
    password: Option<MasterPassword>,
}

struct Shared<S: SessionStorage> {
    account: AccountId,
    params: KdfParams,
    config: SessionConfig,
    store: Arc<dyn VaultStore>,
    keystore: SessionKeyStore<S>,
    clock: Arc<dyn Clock>,
    inner: RwLock<SessionInner>,
    /// Serializes submissions so a stale in-flight unlock cannot overwrite a
    /// newer one.
    unlock_gate: AsyncMutex<()>,
    ticker: StdMutex<Option<JoinHandle<()>>>,
}

impl<S: SessionStorage> Drop for Shared<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.lock().unwrap().take() {
            handle.abort();
        }
    }
}

/// Per-session orchestrator over the vault cipher and session key store.
///
/// Cheap to clone; clones share the same session state. Must be used within
/// a tokio runtime: unlocking spawns the expiry task.
pub struct VaultSession<S: SessionStorage + 'static> {
    shared: Arc<Shared<S>>,
}

impl<S: SessionStorage + 'static> Clone for VaultSession<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: SessionStorage + 'static> VaultSession<S> {
    /// Create a locked session for an account.
    pub fn new(
        account: AccountId,
        store: Arc<dyn VaultStore>,
        storage: S,
        clock: Arc<dyn Clock>,
        params: KdfParams,
        config: SessionConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                account,
                params,
                config,
                store,
                keystore: SessionKeyStore::new(storage),
                clock,
                inner: RwLock::new(SessionInner {
                    state: SessionState::Locked,
                    password: None,
                }),
                unlock_gate: AsyncMutex::new(()),
                ticker: StdMutex::new(None),
            }),
        }
    }

    /// The owning account.
    pub fn account(&self) -> &AccountId {
        &self.shared.account
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.shared.inner.read().unwrap().state
    }

    /// True while a cached password exists and its deadline has not passed.
    pub fn is_unlocked(&self) -> bool {
        match self.state() {
            SessionState::Unlocked { expires_at } => self.shared.clock.now() < expires_at,
            _ => false,
        }
    }

    /// Time left until the cached password expires.
    ///
    /// Computed from the clock on demand; reading it never extends the
    /// deadline.
    pub fn remaining(&self) -> Duration {
        match self.state() {
            SessionState::Unlocked { expires_at } => (expires_at - self.shared.clock.now())
                .to_std()
                .unwrap_or(Duration::ZERO),
            _ => Duration::ZERO,
        }
    }

    /// Submit a candidate master password.
    ///
    /// Verifies it by decrypting existing records: the attempt is accepted
    /// when at least one record decrypts, or vacuously when the account has
    /// no records yet. Success caches the wrapped password and arms the
    /// expiry task; failure returns the session to `Locked`.
    ///
    /// # Errors
    /// - [`Error::InvalidPassword`] when no record decrypts
    /// - [`Error::StorageUnavailable`] when the cache cannot be written;
    ///   the session stays locked rather than holding an unwrapped secret
    pub async fn submit(&self, password: &str) -> Result<()> {
        let _flight = self.shared.unlock_gate.lock().await;

        {
            let mut inner = self.shared.inner.write().unwrap();
            inner.password = None;
            inner.state = SessionState::Unlocking;
        }

        match self.verify(password).await {
            Ok(true) => self.enter_unlocked(password),
            Ok(false) => {
                self.relock_after_failed_attempt();
                Err(Error::InvalidPassword)
            }
            Err(e) => {
                self.relock_after_failed_attempt();
                Err(e)
            }
        }
    }

    async fn verify(&self, password: &str) -> Result<bool> {
        let records = self.shared.store.list(&self.shared.account).await?;
        if records.is_empty() {
            // First-time setup: nothing exists to check against.
            debug!("No records to verify against; accepting unlock");
            return Ok(true);
        }

        let key = derive_key(password, &self.shared.account, &self.shared.params)?;
        Ok(records
            .iter()
            .any(|record| cipher::decrypt_item(&record.ciphertext, &key).is_ok()))
    }

    fn enter_unlocked(&self, password: &str) -> Result<()> {
        let timeout = chrono::Duration::from_std(self.shared.config.timeout)
            .map_err(|e| Error::InvalidInput(format!("Timeout out of range: {}", e)))?;
        let expires_at = self.shared.clock.now() + timeout;

        if let Err(e) = self.shared.keystore.wrap(password, expires_at) {
            self.relock_after_failed_attempt();
            return Err(e);
        }

        {
            let mut inner = self.shared.inner.write().unwrap();
            inner.password = Some(MasterPassword::new(password));
            inner.state = SessionState::Unlocked { expires_at };
        }
        self.start_ticker();

        info!(
            timeout_secs = self.shared.config.timeout.as_secs(),
            "Vault unlocked"
        );
        Ok(())
    }

    fn relock_after_failed_attempt(&self) {
        {
            let mut inner = self.shared.inner.write().unwrap();
            inner.password = None;
            inner.state = SessionState::Locked;
        }
        if let Err(e) = self.shared.keystore.purge() {
            warn!(error = %e, "Failed to clear session storage");
        }
    }

    /// Restore a still-valid cached unlock from session storage, if any.
    ///
    /// Used when a session object is reconstructed mid-browser-session (page
    /// reload). Expired or corrupt cache state is purged.
    ///
    /// # Errors
    /// - [`Error::StorageUnavailable`] when session storage is blocked
    pub fn resume(&self) -> Result<bool> {
        let Some(cached) = self.shared.keystore.unwrap()? else {
            return Ok(false);
        };

        if self.shared.clock.now() >= cached.expires_at {
            self.shared.keystore.purge()?;
            debug!("Cached unlock already expired; staying locked");
            return Ok(false);
        }

        {
            let mut inner = self.shared.inner.write().unwrap();
            inner.password = Some(cached.password);
            inner.state = SessionState::Unlocked {
                expires_at: cached.expires_at,
            };
        }
        self.start_ticker();

        debug!("Vault session restored from session storage");
        Ok(true)
    }

    /// Lock immediately, purging the cached password, the session wrapping
    /// key, and the expiry marker together.
    pub fn lock(&self) {
        self.stop_ticker();
        {
            let mut inner = self.shared.inner.write().unwrap();
            inner.password = None;
            inner.state = SessionState::Locked;
        }
        // Memory is already cleared; a storage failure must not resurrect
        // the session.
        if let Err(e) = self.shared.keystore.purge() {
            warn!(error = %e, "Failed to clear session storage on lock");
        }
        info!("Vault locked");
    }

    /// Check the deadline, expiring the session when it has passed.
    ///
    /// The expiry task calls this periodically; accessors call it lazily so
    /// the deadline holds even if the task is delayed. Returns whether this
    /// call performed the expiry. `Expired` is observable only while the
    /// purge runs; the relock is automatic.
    pub fn poll_expiry(&self) -> bool {
        let now = self.shared.clock.now();
        let expired = {
            let mut inner = self.shared.inner.write().unwrap();
            match inner.state {
                SessionState::Unlocked { expires_at } if now >= expires_at => {
                    inner.password = None;
                    inner.state = SessionState::Expired;
                    true
                }
                _ => false,
            }
        };

        if expired {
            if let Err(e) = self.shared.keystore.purge() {
                warn!(error = %e, "Failed to clear session storage on expiry");
            }
            let mut inner = self.shared.inner.write().unwrap();
            if inner.state == SessionState::Expired {
                inner.state = SessionState::Locked;
            }
            info!("Vault session expired");
        }
        expired
    }

    /// The cached master password.
    ///
    /// # Errors
    /// - [`Error::SessionExpired`] when the deadline passed before the expiry
    ///   task noticed; the session is purged on the way out
    /// - [`Error::NotPermitted`] when the session is locked
    pub fn master_password(&self) -> Result<MasterPassword> {
        let deadline_passed = {
            let inner = self.shared.inner.read().unwrap();
            match inner.state {
                SessionState::Unlocked { expires_at } => {
                    if self.shared.clock.now() < expires_at {
                        return inner
                            .password
                            .clone()
                            .ok_or_else(|| Error::NotPermitted("Session is locked".to_string()));
                    }
                    true
                }
                _ => false,
            }
        };

        if deadline_passed {
            self.poll_expiry();
            return Err(Error::SessionExpired);
        }
        Err(Error::NotPermitted("Session is locked".to_string()))
    }

    fn start_ticker(&self) {
        let weak: Weak<Shared<S>> = Arc::downgrade(&self.shared);
        let tick = self.shared.config.tick;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                interval.tick().await;
                let Some(shared) = weak.upgrade() else { break };
                let session = VaultSession { shared };
                if session.poll_expiry() {
                    break;
                }
                if !matches!(session.state(), SessionState::Unlocked { .. }) {
                    break;
                }
            }
        });

        let mut ticker = self.shared.ticker.lock().unwrap();
        if let Some(old) = ticker.replace(handle) {
            old.abort();
        }
    }

    fn stop_ticker(&self) {
        if let Some(handle) = self.shared.ticker.lock().unwrap().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::keystore::{EXPIRES_AT_KEY, SESSION_KEY_KEY, WRAPPED_PASSWORD_KEY};
    use crate::VaultItemPayload;
    use vaultpass_storage::{MemorySessionStorage, MemoryStore, VaultRecord};

    const PASSWORD: &str = "Tr0ub4dor&3";

    struct Fixture {
        session: VaultSession<Arc<MemorySessionStorage>>,
        storage: Arc<MemorySessionStorage>,
        store: Arc<MemoryStore>,
        clock: ManualClock,
        account: AccountId,
    }

    fn fixture(timeout: Duration) -> Fixture {
        let account = AccountId::new("alice@example.com").unwrap();
        let store = Arc::new(MemoryStore::new());
        let storage = Arc::new(MemorySessionStorage::new());
        let clock = ManualClock::starting_now();

        let session = VaultSession::new(
            account.clone(),
            store.clone(),
            storage.clone(),
            Arc::new(clock.clone()),
            KdfParams::moderate(),
            SessionConfig::default()
                .with_timeout(timeout)
                .with_tick(Duration::from_millis(10)),
        );

        Fixture {
            session,
            storage,
            store,
            clock,
            account,
        }
    }

    async fn seed_record(fx: &Fixture, password: &str) {
        let key = derive_key(password, &fx.account, &KdfParams::moderate()).unwrap();
        let payload = VaultItemPayload {
            title: "Email".to_string(),
            username: "alice".to_string(),
            password: "hunter2".to_string(),
            url: String::new(),
            notes: String::new(),
        };
        let ciphertext = cipher::encrypt_item(&payload, &key).unwrap();
        fx.store
            .put(VaultRecord::new(fx.account.clone(), ciphertext, "email"))
            .await
            .unwrap();
    }

    fn assert_fully_purged(fx: &Fixture) {
        for key in [WRAPPED_PASSWORD_KEY, SESSION_KEY_KEY, EXPIRES_AT_KEY] {
            assert!(
                fx.storage.get(key).unwrap().is_none(),
                "{} left behind",
                key
            );
        }
        assert!(fx.session.master_password().is_err());
    }

    #[tokio::test]
    async fn test_unlock_with_zero_records_is_vacuously_accepted() {
        let fx = fixture(Duration::from_secs(600));

        fx.session.submit(PASSWORD).await.unwrap();

        assert!(fx.session.is_unlocked());
        assert_eq!(fx.session.master_password().unwrap().as_str(), PASSWORD);
    }

    #[tokio::test]
    async fn test_unlock_verifies_against_existing_record() {
        let fx = fixture(Duration::from_secs(600));
        seed_record(&fx, PASSWORD).await;

        fx.session.submit(PASSWORD).await.unwrap();
        assert!(fx.session.is_unlocked());
    }

    #[tokio::test]
    async fn test_wrong_password_locks_and_purges() {
        let fx = fixture(Duration::from_secs(600));
        seed_record(&fx, PASSWORD).await;

        let err = fx.session.submit("wrongpass").await.unwrap_err();

        assert!(matches!(err, Error::InvalidPassword));
        assert_eq!(fx.session.state(), SessionState::Locked);
        assert_fully_purged(&fx);
    }

    #[tokio::test]
    async fn test_explicit_lock_purges_everything() {
        let fx = fixture(Duration::from_secs(600));
        fx.session.submit(PASSWORD).await.unwrap();

        fx.session.lock();

        assert_eq!(fx.session.state(), SessionState::Locked);
        assert!(!fx.session.is_unlocked());
        assert_fully_purged(&fx);
    }

    #[tokio::test]
    async fn test_timeout_expiry_purges_everything() {
        let fx = fixture(Duration::from_secs(1));
        fx.session.submit(PASSWORD).await.unwrap();
        assert!(fx.session.is_unlocked());

        // Drive expiry by hand so the background task cannot race the assert.
        fx.session.stop_ticker();
        fx.clock.advance(Duration::from_millis(1100));

        assert!(fx.session.poll_expiry());
        assert_eq!(fx.session.state(), SessionState::Locked);
        assert_fully_purged(&fx);
    }

    #[tokio::test]
    async fn test_deadline_holds_even_without_polling() {
        let fx = fixture(Duration::from_secs(1));
        fx.session.submit(PASSWORD).await.unwrap();

        fx.session.stop_ticker();
        fx.clock.advance(Duration::from_millis(1100));

        // The lazy check fires before the tick task notices.
        let err = fx.session.master_password().unwrap_err();
        assert!(matches!(err, Error::SessionExpired));
        assert_eq!(fx.session.state(), SessionState::Locked);
        assert_fully_purged(&fx);
    }

    #[tokio::test]
    async fn test_polling_never_extends_the_deadline() {
        let fx = fixture(Duration::from_secs(10));
        fx.session.submit(PASSWORD).await.unwrap();

        fx.clock.advance(Duration::from_secs(4));
        assert!(!fx.session.poll_expiry());
        let remaining = fx.session.remaining();
        assert!(remaining <= Duration::from_secs(6), "got {:?}", remaining);

        // Repeated polls change nothing.
        assert!(!fx.session.poll_expiry());
        assert!(fx.session.remaining() <= Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_resubmit_resets_the_deadline() {
        let fx = fixture(Duration::from_secs(10));
        fx.session.submit(PASSWORD).await.unwrap();

        fx.clock.advance(Duration::from_secs(6));
        fx.session.submit(PASSWORD).await.unwrap();

        assert!(fx.session.remaining() > Duration::from_secs(9));
    }

    #[tokio::test]
    async fn test_expiry_task_locks_in_background() {
        let fx = fixture(Duration::from_secs(1));
        fx.session.submit(PASSWORD).await.unwrap();

        fx.clock.advance(Duration::from_secs(2));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(fx.session.state(), SessionState::Locked);
        assert_fully_purged(&fx);
    }

    #[tokio::test]
    async fn test_resume_restores_unexpired_session() {
        let fx = fixture(Duration::from_secs(600));
        fx.session.submit(PASSWORD).await.unwrap();

        // A fresh session object over the same browser session storage.
        let restored = VaultSession::new(
            fx.account.clone(),
            fx.store.clone(),
            fx.storage.clone(),
            Arc::new(fx.clock.clone()),
            KdfParams::moderate(),
            SessionConfig::default(),
        );

        assert!(restored.resume().unwrap());
        assert!(restored.is_unlocked());
        assert_eq!(restored.master_password().unwrap().as_str(), PASSWORD);
    }

    #[tokio::test]
    async fn test_resume_after_deadline_stays_locked() {
        let fx = fixture(Duration::from_secs(1));
        fx.session.submit(PASSWORD).await.unwrap();
        fx.session.stop_ticker();

        fx.clock.advance(Duration::from_secs(2));

        let restored = VaultSession::new(
            fx.account.clone(),
            fx.store.clone(),
            fx.storage.clone(),
            Arc::new(fx.clock.clone()),
            KdfParams::moderate(),
            SessionConfig::default(),
        );

        assert!(!restored.resume().unwrap());
        assert_eq!(restored.state(), SessionState::Locked);
        assert_fully_purged(&fx);
    }

    #[tokio::test]
    async fn test_unavailable_storage_degrades_to_locked() {
        struct BlockedStorage;

        impl SessionStorage for BlockedStorage {
            fn get(&self, _key: &str) -> Result<Option<String>> {
                Err(Error::StorageUnavailable("blocked".to_string()))
            }
            fn set(&self, _key: &str, _value: &str) -> Result<()> {
                Err(Error::StorageUnavailable("blocked".to_string()))
            }
            fn remove(&self, _key: &str) -> Result<()> {
                Err(Error::StorageUnavailable("blocked".to_string()))
            }
        }

        let account = AccountId::new("alice@example.com").unwrap();
        let session = VaultSession::new(
            account,
            Arc::new(MemoryStore::new()),
            BlockedStorage,
            Arc::new(ManualClock::starting_now()),
            KdfParams::moderate(),
            SessionConfig::default(),
        );

        let err = session.submit(PASSWORD).await.unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable(_)));
        assert_eq!(session.state(), SessionState::Locked);
        assert!(session.master_password().is_err());
    }
}
