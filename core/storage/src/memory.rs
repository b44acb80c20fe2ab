//! In-memory storage implementations for testing and development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::record::VaultRecord;
use crate::session::SessionStorage;
use crate::store::VaultStore;
use vaultpass_common::{AccountId, Error, RecordId, Result};

/// In-memory vault record store.
///
/// All data is held in memory and lost on drop. Write calls are counted so
/// tests can assert that a failed operation never persisted anything.
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<RecordId, VaultRecord>>>,
    puts: AtomicUsize,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            puts: AtomicUsize::new(0),
        }
    }

    /// Number of `put` calls observed since creation.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VaultStore for MemoryStore {
    async fn get(&self, id: &RecordId) -> Result<VaultRecord> {
        self.records
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Record not found: {}", id)))
    }

    async fn list(&self, owner: &AccountId) -> Result<Vec<VaultRecord>> {
        let records = self.records.read().unwrap();
        let mut result: Vec<VaultRecord> = records
            .values()
            .filter(|r| &r.owner_id == owner)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn put(&self, record: VaultRecord) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.records
            .write()
            .unwrap()
            .insert(record.id.clone(), record);
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        self.records
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("Record not found: {}", id)))
    }
}

/// In-memory session storage.
///
/// Stands in for per-session browser storage: entries vanish with the
/// instance, and each session owns its own instance.
pub struct MemorySessionStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStorage {
    /// Create empty session storage.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// True when no entries exist.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

impl Default for MemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}
