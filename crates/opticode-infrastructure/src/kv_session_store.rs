//! Key-value backed implementation of the dual-store session persistence.
//!
//! Maintains the history feed and the library as two JSON arrays under their
//! own substrate keys, plus the current-user marker. Owns identity
//! assignment, rename propagation across both collections and the
//! deduplicated union lookup.

use async_trait::async_trait;
use opticode_core::error::Result;
use opticode_core::session::{SessionRecord, SessionStore};
use opticode_core::storage::{KeyValueStore, StoreChange};
use opticode_core::user::UserProfile;
use std::sync::Arc;
use tokio::sync::broadcast;

const HISTORY_KEY: &str = "opticode.history";
const LIBRARY_KEY: &str = "opticode.library";
const USER_KEY: &str = "opticode.user";

const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Dual-store session persistence over an injected key-value substrate.
pub struct KvSessionStore {
    store: Arc<dyn KeyValueStore>,
    history_limit: usize,
}

impl KvSessionStore {
    /// Creates a store with the default history cap.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_history_limit(store, DEFAULT_HISTORY_LIMIT)
    }

    /// Creates a store keeping at most `history_limit` history entries.
    pub fn with_history_limit(store: Arc<dyn KeyValueStore>, history_limit: usize) -> Self {
        Self {
            store,
            history_limit,
        }
    }

    /// Reads a collection, treating every failure as empty.
    ///
    /// A corrupt payload or an unreadable substrate must never propagate a
    /// parse failure upward; the caller sees an empty collection and the
    /// next successful write repairs the key.
    async fn read_records(&self, key: &str) -> Vec<SessionRecord> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!("failed to read collection '{}': {}", key, err);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(
                    "corrupt collection '{}' treated as empty: {}",
                    key,
                    err
                );
                Vec::new()
            }
        }
    }

    /// Persists a collection. Write failures are recoverable: the substrate
    /// keeps its previous value and the caller's records stay in memory.
    async fn write_records(&self, key: &str, records: &[SessionRecord]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.store.set(key, raw).await
    }
}

#[async_trait]
impl SessionStore for KvSessionStore {
    async fn save_to_history(&self, record: &SessionRecord) -> Result<SessionRecord> {
        let mut finalized = record.clone();
        finalized.ensure_identity();

        let mut history = self.read_records(HISTORY_KEY).await;
        history.insert(0, finalized.clone());
        history.truncate(self.history_limit);
        self.write_records(HISTORY_KEY, &history).await?;

        tracing::debug!("saved session '{}' to history", finalized.id);
        Ok(finalized)
    }

    async fn save_to_library(&self, record: &SessionRecord) -> Result<SessionRecord> {
        let mut finalized = record.clone();
        finalized.ensure_identity();

        let mut library = self.read_records(LIBRARY_KEY).await;
        if let Some(existing) = library.iter().find(|r| r.id == finalized.id) {
            tracing::debug!("session '{}' already in library", finalized.id);
            return Ok(existing.clone());
        }

        library.insert(0, finalized.clone());
        self.write_records(LIBRARY_KEY, &library).await?;

        tracing::debug!("saved session '{}' to library", finalized.id);
        Ok(finalized)
    }

    async fn rename(&self, id: &str, new_name: &str) -> Result<()> {
        let mut renamed_any = false;

        for key in [HISTORY_KEY, LIBRARY_KEY] {
            let mut records = self.read_records(key).await;
            let mut changed = false;
            for record in records.iter_mut().filter(|r| r.id == id) {
                record.name = new_name.to_string();
                changed = true;
            }
            if changed {
                self.write_records(key, &records).await?;
                renamed_any = true;
            }
        }

        if !renamed_any {
            // Renaming an unknown session is a benign no-op.
            tracing::warn!("rename requested for unknown session '{}'", id);
        }
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<SessionRecord>> {
        // Union of history and library, deduplicated by id. History wins on
        // divergence: it is the append-of-record. Within history the
        // newest-first order makes the first match the latest write.
        let history = self.read_records(HISTORY_KEY).await;
        if let Some(record) = history.into_iter().find(|r| r.id == id) {
            return Ok(Some(record));
        }

        let library = self.read_records(LIBRARY_KEY).await;
        Ok(library.into_iter().find(|r| r.id == id))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        for key in [HISTORY_KEY, LIBRARY_KEY] {
            let mut records = self.read_records(key).await;
            let before = records.len();
            records.retain(|r| r.id != id);
            if records.len() != before {
                self.write_records(key, &records).await?;
            }
        }
        tracing::debug!("deleted session '{}' from both collections", id);
        Ok(())
    }

    async fn list_history(&self) -> Result<Vec<SessionRecord>> {
        Ok(self.read_records(HISTORY_KEY).await)
    }

    async fn list_library(&self) -> Result<Vec<SessionRecord>> {
        Ok(self.read_records(LIBRARY_KEY).await)
    }

    async fn current_user(&self) -> Result<Option<UserProfile>> {
        let raw = match self.store.get(USER_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(err) => {
                tracing::warn!("failed to read user marker: {}", err);
                return Ok(None);
            }
        };

        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(err) => {
                tracing::warn!("corrupt user marker treated as signed out: {}", err);
                Ok(None)
            }
        }
    }

    async fn set_current_user(&self, profile: &UserProfile) -> Result<()> {
        let raw = serde_json::to_string(profile)?;
        self.store.set(USER_KEY, raw).await
    }

    async fn clear_current_user(&self) -> Result<()> {
        self.store.remove(USER_KEY).await
    }

    fn watch(&self) -> broadcast::Receiver<StoreChange> {
        self.store.watch()
    }
}
