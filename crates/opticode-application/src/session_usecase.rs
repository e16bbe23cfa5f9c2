//! Session use case implementation.
//!
//! `SessionUseCase` orchestrates the dual-store persistence, the hydration
//! handoff and the optional remote gateway mirror. It owns the sequencing
//! rules: dependent remote operations are awaited in order (a rename issued
//! after a save runs only once the save has completed), and the optimistic
//! local delete is reverted when the remote delete is confirmed to have
//! failed.

use crate::hydration::{SessionLink, SessionView};
use opticode_core::error::Result;
use opticode_core::gateway::{CreateSessionRequest, SessionGateway, SessionSummary};
use opticode_core::pipeline::PipelineResult;
use opticode_core::session::{SessionRecord, SessionStore};
use opticode_core::storage::StoreChange;
use opticode_core::user::UserProfile;
use opticode_infrastructure::HandoffSlot;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Use case for recording, curating and reopening optimization sessions.
///
/// # Variants
///
/// Without a gateway this is the browser-only variant: all persistence is
/// local. With a gateway, sessions born while signed in are mirrored
/// remotely and carry the gateway-assigned id; sessions born signed out
/// keep their locally generated id, and the gateway tolerates operations on
/// ids it never saw (rename matches nothing, delete reports already
/// deleted).
pub struct SessionUseCase {
    /// Dual-store persistence (history + library + user marker)
    store: Arc<dyn SessionStore>,
    /// Single-slot hydration handoff
    handoff: Arc<HandoffSlot>,
    /// Optional remote mirror
    gateway: Option<Arc<dyn SessionGateway>>,
}

impl SessionUseCase {
    /// Creates the browser-only variant.
    pub fn new(store: Arc<dyn SessionStore>, handoff: Arc<HandoffSlot>) -> Self {
        Self {
            store,
            handoff,
            gateway: None,
        }
    }

    /// Creates the networked variant with a remote mirror.
    pub fn with_gateway(
        store: Arc<dyn SessionStore>,
        handoff: Arc<HandoffSlot>,
        gateway: Arc<dyn SessionGateway>,
    ) -> Self {
        Self {
            store,
            handoff,
            gateway: Some(gateway),
        }
    }

    /// Mirrors a not-yet-persisted record to the gateway, adopting the
    /// assigned id.
    ///
    /// First persistence assigns identity: remote when mirrored at that
    /// moment, local otherwise, immutable either way. When the record had
    /// no name, the default derived from the assigned id is pushed back to
    /// the gateway, strictly after the create has completed, never raced
    /// against it.
    async fn mirror_create(&self, record: &mut SessionRecord) -> Result<()> {
        let Some(gateway) = &self.gateway else {
            return Ok(());
        };
        let Some(user) = self.store.current_user().await? else {
            return Ok(());
        };
        if !record.id.is_empty() {
            return Ok(());
        }

        let request = CreateSessionRequest::from_record(&user.email, record);
        record.id = gateway.create(&request).await?;

        if record.name.trim().is_empty() {
            record.name = format!("Session-{}", record.id);
            if let Err(err) = gateway.rename(&record.id, &record.name).await {
                // Non-fatal: history wins on read; logged for later re-sync.
                tracing::warn!(
                    "failed to sync default name for '{}': {}",
                    record.id,
                    err
                );
            }
        }
        Ok(())
    }

    /// Records a completed optimization run in the history feed.
    ///
    /// A failed remote mirror degrades to a local-only record (logged); the
    /// run itself is never lost to a network error.
    pub async fn record_run(&self, result: &PipelineResult) -> Result<SessionRecord> {
        let mut record = SessionRecord::from_result(result);
        if let Err(err) = self.mirror_create(&mut record).await {
            tracing::warn!("remote session create failed; keeping run local: {}", err);
        }
        self.store.save_to_history(&record).await
    }

    /// Saves a record to the curated library (idempotent per id).
    pub async fn save_to_library(&self, record: &SessionRecord) -> Result<SessionRecord> {
        let mut record = record.clone();
        if let Err(err) = self.mirror_create(&mut record).await {
            tracing::warn!("remote session create failed; keeping save local: {}", err);
        }
        self.store.save_to_library(&record).await
    }

    /// Renames a session everywhere it is known.
    ///
    /// Remote first: the local rename runs only after the remote one is
    /// confirmed, so a gateway failure surfaces before the two stores can
    /// diverge.
    pub async fn rename_session(&self, id: &str, new_name: &str) -> Result<()> {
        if let Some(gateway) = &self.gateway {
            if self.store.current_user().await?.is_some() {
                gateway.rename(id, new_name).await?;
            }
        }
        self.store.rename(id, new_name).await
    }

    /// Deletes a session from both collections and the remote mirror.
    ///
    /// The local removal is optimistic; a confirmed remote failure reverts
    /// it and surfaces the error. "Already deleted" remotely is success.
    pub async fn delete_session(&self, id: &str) -> Result<()> {
        let in_history = self
            .store
            .list_history()
            .await?
            .into_iter()
            .find(|r| r.id == id);
        let in_library = self
            .store
            .list_library()
            .await?
            .into_iter()
            .find(|r| r.id == id);

        self.store.delete(id).await?;

        let Some(gateway) = &self.gateway else {
            return Ok(());
        };
        if self.store.current_user().await?.is_none() {
            return Ok(());
        }

        if let Err(err) = gateway.delete(id).await {
            tracing::warn!(
                "remote delete of '{}' failed; reverting local removal: {}",
                id,
                err
            );
            if let Some(record) = in_history {
                self.store.save_to_history(&record).await?;
            }
            if let Some(record) = in_library {
                self.store.save_to_library(&record).await?;
            }
            return Err(err);
        }
        Ok(())
    }

    /// Publishes a session into the handoff slot and returns the
    /// navigation target for the optimizer page.
    pub async fn open_session(&self, record: &SessionRecord) -> Result<SessionLink> {
        self.handoff.publish(record).await?;
        Ok(SessionLink::new(record.id.clone()))
    }

    /// Reconstructs page state from the handoff slot, if the navigation
    /// carried a session id and the slot matches it.
    ///
    /// No id, an empty slot or a mismatched slot all fall back to fresh
    /// session state (`None`), never an error.
    pub async fn hydrate(&self, url_session_id: Option<&str>) -> Result<Option<SessionView>> {
        let Some(id) = url_session_id.filter(|id| !id.is_empty()) else {
            return Ok(None);
        };
        Ok(self.handoff.consume(id).await?.map(SessionView::from_record))
    }

    /// Looks up one session over the union of both collections.
    pub async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>> {
        self.store.get_by_id(id).await
    }

    /// The history feed, newest first.
    pub async fn list_history(&self) -> Result<Vec<SessionRecord>> {
        self.store.list_history().await
    }

    /// The library, newest first.
    pub async fn list_library(&self) -> Result<Vec<SessionRecord>> {
        self.store.list_library().await
    }

    /// The owner's sessions as known to the gateway; empty when signed out
    /// or in the browser-only variant.
    pub async fn remote_sessions(&self) -> Result<Vec<SessionSummary>> {
        let Some(gateway) = &self.gateway else {
            return Ok(Vec::new());
        };
        let Some(user) = self.store.current_user().await? else {
            return Ok(Vec::new());
        };
        gateway.list_by_owner(&user.email).await
    }

    /// Marks `profile` as the signed-in user.
    pub async fn sign_in(&self, profile: &UserProfile) -> Result<()> {
        self.store.set_current_user(profile).await
    }

    /// Clears the signed-in user marker.
    pub async fn sign_out(&self) -> Result<()> {
        self.store.clear_current_user().await
    }

    /// The signed-in user, re-read from the substrate on every call so a
    /// logout in another tab is observed.
    pub async fn current_user(&self) -> Result<Option<UserProfile>> {
        self.store.current_user().await
    }

    /// Substrate change notifications; pages re-read their listings (and
    /// the user marker) when a key they depend on changes.
    pub fn changes(&self) -> broadcast::Receiver<StoreChange> {
        self.store.watch()
    }
}
