//! Key-value persistence substrate abstraction.
//!
//! The session layer never touches a concrete storage medium directly. It is
//! written against [`KeyValueStore`], an injected substrate with a small
//! `get`/`set`/`remove` surface plus an explicit change-notification
//! subscription. Production and test implementations differ only in backing
//! medium (a durable file store versus an in-memory map).

use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Notification that a key in the substrate was mutated.
///
/// Emitted to every subscriber other than the mutating call site's own
/// receiver loop; this is how a component observes writes made by another
/// holder of the same store (the cross-tab case). Receivers decide
/// themselves whether to re-read dependent state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    /// The key that was set or removed.
    pub key: String,
}

/// An abstract key-value store with change notification.
///
/// Values are JSON text; the substrate itself never interprets them.
///
/// # Failure contract
///
/// A failed write must leave the previously stored value intact and surface
/// a recoverable error; the caller's in-memory copy is never lost. Reads of
/// an absent key return `Ok(None)` rather than an error.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. Removing an absent key is a no-op.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Subscribes to mutation notifications for this substrate.
    ///
    /// Every `set` and `remove` (by any holder of the store) produces one
    /// [`StoreChange`]. Lagged receivers may miss intermediate events; the
    /// payload carries only the key, so a late re-read is always safe.
    fn watch(&self) -> broadcast::Receiver<StoreChange>;
}
