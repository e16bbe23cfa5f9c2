//! Remote session gateway trait and wire documents.
//!
//! The gateway is an external collaborator: the server that owns session
//! data in the networked variant. The local persistence layer acts as a
//! cache/mirror in front of it. This module defines only the consuming
//! interface and the request/response documents.

use crate::error::Result;
use crate::pipeline::{AiOutcome, CodeAnalysis, ErrorReport};
use crate::session::{OptimizationLevel, SessionRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of the session-create call.
///
/// Field names are the gateway's wire keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub email: String,
    pub name: String,
    pub optimization_level: OptimizationLevel,
    pub original_code: String,
    pub optimized_code: String,
    pub original_analysis: CodeAnalysis,
    pub optimized_analysis: CodeAnalysis,
    pub l1_changes: Vec<String>,
    pub l2: AiOutcome,
    pub error_report: ErrorReport,
}

impl CreateSessionRequest {
    /// Builds the create body for `record`, owned by `email`.
    pub fn from_record(email: &str, record: &SessionRecord) -> Self {
        Self {
            email: email.to_string(),
            name: record.name.clone(),
            optimization_level: record.level,
            original_code: record.original_code.clone(),
            optimized_code: record.optimized_code.clone(),
            original_analysis: record.original_analysis.clone(),
            optimized_analysis: record.optimized_analysis.clone(),
            l1_changes: record.l1_changes.clone(),
            l2: record.l2.clone(),
            error_report: record.error_report.clone(),
        }
    }
}

/// One entry of the list-by-owner response.
///
/// `saved_at` is kept as the server's ISO-8601 string; the server emits
/// naive UTC timestamps and ISO strings order lexicographically, which is
/// all listings need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "level")]
    pub optimization_level: OptimizationLevel,
    #[serde(default)]
    pub saved_at: String,
}

/// The remote session service, as consumed by this layer.
///
/// All operations are recoverable at the call site; a gateway failure must
/// never crash the hosting page or corrupt local state.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Creates a session remotely and returns the assigned id.
    async fn create(&self, request: &CreateSessionRequest) -> Result<String>;

    /// Renames a remote session.
    async fn rename(&self, id: &str, name: &str) -> Result<()>;

    /// Lists the owner's sessions, newest first.
    async fn list_by_owner(&self, email: &str) -> Result<Vec<SessionSummary>>;

    /// Deletes a remote session.
    ///
    /// Implementations must tolerate "already deleted" as success.
    async fn delete(&self, id: &str) -> Result<()>;
}
