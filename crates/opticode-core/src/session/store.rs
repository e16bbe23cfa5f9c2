//! Dual-store session persistence trait.
//!
//! Defines the interface for the two overlapping session collections:
//! the chronological **history** feed and the curated **library**.

use super::model::SessionRecord;
use crate::error::Result;
use crate::storage::StoreChange;
use crate::user::UserProfile;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// An abstract store maintaining the history and library collections.
///
/// The two collections are independent until a delete, which applies to
/// both; an id present in both refers to the same logical session and must
/// converge on the same `name` after any rename.
///
/// # Implementation Notes
///
/// Implementations own identity assignment (a collision-resistant token on
/// first save), must treat a corrupt or unreadable collection as empty on
/// read, and must surface a failed write as a recoverable error without
/// losing the caller's in-memory record.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Saves a record to the history feed.
    ///
    /// Assigns `id`, a default `name` and `saved_at` when missing, prepends
    /// the record (newest first) and persists. History is an append log:
    /// duplicate ids are not deduplicated on write; the latest write for an
    /// id logically supersedes earlier ones.
    ///
    /// Returns the finalized record. On a failed write the caller's record
    /// is untouched and the operation may be retried.
    async fn save_to_history(&self, record: &SessionRecord) -> Result<SessionRecord>;

    /// Saves a record to the library.
    ///
    /// Idempotent per id: when the library already holds a record with the
    /// same id this is a no-op returning the stored record, not a duplicate
    /// insert.
    ///
    /// Returns the finalized record. On a failed write the caller's record
    /// is untouched and the operation may be retried.
    async fn save_to_library(&self, record: &SessionRecord) -> Result<SessionRecord>;

    /// Renames the session `id` in *both* collections.
    ///
    /// Collections without a matching record are left unchanged. Renaming an
    /// unknown id is a benign no-op (logged, never an error).
    async fn rename(&self, id: &str, new_name: &str) -> Result<()>;

    /// Looks up `id` over the union of history and library.
    ///
    /// The union is deduplicated by id; when both collections hold divergent
    /// copies, the history copy wins (history is the append-of-record).
    async fn get_by_id(&self, id: &str) -> Result<Option<SessionRecord>>;

    /// Removes every record with `id` from both collections.
    ///
    /// Idempotent: deleting an absent id is a no-op.
    async fn delete(&self, id: &str) -> Result<()>;

    /// The full history feed, newest first. Empty when nothing is stored.
    async fn list_history(&self) -> Result<Vec<SessionRecord>>;

    /// The full library, newest first. Empty when nothing is stored.
    async fn list_library(&self) -> Result<Vec<SessionRecord>>;

    /// The signed-in user marker, if any.
    async fn current_user(&self) -> Result<Option<UserProfile>>;

    /// Sets the signed-in user marker.
    async fn set_current_user(&self, profile: &UserProfile) -> Result<()>;

    /// Clears the signed-in user marker (logout).
    async fn clear_current_user(&self) -> Result<()>;

    /// Substrate change subscription, for refreshing after cross-tab
    /// mutations (e.g. a logout or history edit in another tab).
    fn watch(&self) -> broadcast::Receiver<StoreChange>;
}
