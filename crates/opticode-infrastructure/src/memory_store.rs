//! In-memory KeyValueStore implementation.
//!
//! Backing substrate for tests and for the no-backend variant. Clones share
//! one underlying map and one notification channel, which is exactly the
//! cross-tab model: a component holding one clone observes writes made
//! through any other clone via [`KeyValueStore::watch`].

use async_trait::async_trait;
use opticode_core::error::{OpticodeError, Result};
use opticode_core::storage::{KeyValueStore, StoreChange};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

struct MemoryStoreInner {
    entries: Mutex<HashMap<String, String>>,
    /// Total payload bytes allowed, when simulating a bounded medium.
    quota_bytes: Option<usize>,
    events: broadcast::Sender<StoreChange>,
}

/// A shared in-memory key-value store with change notification.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

impl MemoryStore {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates a store that rejects writes once total payload bytes would
    /// exceed `quota_bytes`, mirroring a quota-limited browser store.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self::build(Some(quota_bytes))
    }

    fn build(quota_bytes: Option<usize>) -> Self {
        let (events, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(MemoryStoreInner {
                entries: Mutex::new(HashMap::new()),
                quota_bytes,
                events,
            }),
        }
    }

    fn notify(&self, key: &str) {
        // No receivers is fine; nobody is watching.
        let _ = self.inner.events.send(StoreChange {
            key: key.to_string(),
        });
    }

    fn lock_entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.inner
            .entries
            .lock()
            .map_err(|_| OpticodeError::internal("memory store mutex poisoned"))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.lock_entries()?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        {
            let mut entries = self.lock_entries()?;

            if let Some(quota) = self.inner.quota_bytes {
                let used: usize = entries
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(k, v)| k.len() + v.len())
                    .sum();
                if used + key.len() + value.len() > quota {
                    // The previously stored value stays intact.
                    return Err(OpticodeError::storage(format!(
                        "quota exceeded writing key '{key}'"
                    )));
                }
            }

            entries.insert(key.to_string(), value);
        }
        self.notify(key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let removed = {
            let mut entries = self.lock_entries()?;
            entries.remove(key).is_some()
        };
        if removed {
            self.notify(key);
        }
        Ok(())
    }

    fn watch(&self) -> broadcast::Receiver<StoreChange> {
        self.inner.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();

        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v1".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v1".to_string()));

        store.set("k", "v2".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);

        // Removing an absent key is a no-op.
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other_tab = store.clone();

        store.set("k", "v".to_string()).await.unwrap();
        assert_eq!(other_tab.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_watch_observes_mutations() {
        let store = MemoryStore::new();
        let mut changes = store.watch();

        let other_tab = store.clone();
        other_tab.set("k", "v".to_string()).await.unwrap();
        other_tab.remove("k").await.unwrap();

        assert_eq!(changes.recv().await.unwrap().key, "k");
        assert_eq!(changes.recv().await.unwrap().key, "k");
    }

    #[tokio::test]
    async fn test_quota_rejects_write_and_preserves_value() {
        let store = MemoryStore::with_quota(8);

        store.set("k", "v".to_string()).await.unwrap();

        let err = store
            .set("k", "a value far beyond the quota".to_string())
            .await
            .unwrap_err();
        assert!(err.is_storage());

        // The old value survived the failed write.
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }
}
