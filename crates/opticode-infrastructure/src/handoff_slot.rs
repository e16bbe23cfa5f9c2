//! Single-slot session handoff channel.
//!
//! Moves one fully-formed session across a page-navigation boundary: the
//! source page publishes the record and navigates with the session id in the
//! target URL; the target page consumes the slot only when the stored id
//! matches the id it was asked to open. Owner-set / consumer-clear, one
//! consumption per publish. This is explicitly not a cache: two concurrent
//! publishers race and the last write before the reader mounts wins.

use opticode_core::error::{OpticodeError, Result};
use opticode_core::session::SessionRecord;
use opticode_core::storage::KeyValueStore;
use std::sync::Arc;

const HANDOFF_KEY: &str = "opticode.handoff";

/// Transient single-entry holding area for session hydration.
pub struct HandoffSlot {
    store: Arc<dyn KeyValueStore>,
}

impl HandoffSlot {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Publishes a session into the slot, replacing any previous occupant.
    ///
    /// The record must already carry its identity; the consumer validates
    /// the slot against the id in the navigation target.
    pub async fn publish(&self, record: &SessionRecord) -> Result<()> {
        if record.id.is_empty() {
            return Err(OpticodeError::internal(
                "cannot publish a session without an assigned id",
            ));
        }
        let raw = serde_json::to_string(record)?;
        self.store.set(HANDOFF_KEY, raw).await
    }

    /// Consumes the slot if it holds the session `expected_id`.
    ///
    /// - Matching slot: returns the record and clears the slot
    ///   (consume-once; a second call yields `None`).
    /// - Absent slot or mismatched id: returns `None`, slot untouched;
    ///   the caller falls back to fresh session state.
    /// - Corrupt slot: cleared and treated as absent; unreadable garbage
    ///   can never be consumed.
    pub async fn consume(&self, expected_id: &str) -> Result<Option<SessionRecord>> {
        let raw = match self.store.get(HANDOFF_KEY).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let record: SessionRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!("corrupt handoff slot cleared: {}", err);
                self.store.remove(HANDOFF_KEY).await?;
                return Ok(None);
            }
        };

        if record.id != expected_id {
            tracing::debug!(
                "handoff slot holds '{}', expected '{}'; falling back to fresh state",
                record.id,
                expected_id
            );
            return Ok(None);
        }

        if let Err(err) = self.store.remove(HANDOFF_KEY).await {
            // The record is still valid; a failed clear only risks a
            // second hydration, which the id check bounds.
            tracing::warn!("failed to clear handoff slot: {}", err);
        }
        Ok(Some(record))
    }

    /// Owner-side reset of the slot.
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(HANDOFF_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryStore;

    fn slot() -> (HandoffSlot, MemoryStore) {
        let substrate = MemoryStore::new();
        (HandoffSlot::new(Arc::new(substrate.clone())), substrate)
    }

    fn record(id: &str) -> SessionRecord {
        SessionRecord {
            id: id.to_string(),
            name: format!("Session-{id}"),
            original_code: "x = 1".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_consume_once() {
        let (slot, _) = slot();

        slot.publish(&record("s1")).await.unwrap();

        let hydrated = slot.consume("s1").await.unwrap().unwrap();
        assert_eq!(hydrated.id, "s1");

        // Second read with no new write: fresh-state fallback.
        assert!(slot.consume("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mismatched_id_leaves_slot_intact() {
        let (slot, _) = slot();

        slot.publish(&record("s1")).await.unwrap();

        assert!(slot.consume("s2").await.unwrap().is_none());
        // The slot still serves its intended reader.
        assert!(slot.consume("s1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_empty_slot_is_fresh_state() {
        let (slot, _) = slot();
        assert!(slot.consume("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_publisher_wins() {
        let (slot, _) = slot();

        slot.publish(&record("s1")).await.unwrap();
        slot.publish(&record("s2")).await.unwrap();

        assert!(slot.consume("s1").await.unwrap().is_none());
        assert!(slot.consume("s2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_slot_is_cleared() {
        let (slot, substrate) = slot();

        substrate
            .set("opticode.handoff", "garbage".to_string())
            .await
            .unwrap();

        assert!(slot.consume("s1").await.unwrap().is_none());
        assert_eq!(substrate.get("opticode.handoff").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_publish_requires_identity() {
        let (slot, _) = slot();
        let err = slot.publish(&SessionRecord::default()).await.unwrap_err();
        assert!(matches!(err, OpticodeError::Internal(_)));
    }
}
