//! Hydrated session view and navigation target.
//!
//! What the optimizer page reconstructs after a handoff: the full record
//! plus the derived explanation flags. Every nested payload of
//! `SessionRecord` is serde-defaulted, so a view built from a sparse or
//! legacy record still renders without dereferencing an absent field.

use opticode_core::pipeline::ExplanationFlags;
use opticode_core::session::SessionRecord;

/// Navigation target for reopening a session on the optimizer page.
///
/// Carries the stable id as a query parameter; the handoff slot carries the
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLink {
    pub session_id: String,
}

impl SessionLink {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }

    /// The target URL, e.g. `/optimizer?session=a1b2c3`.
    pub fn as_url(&self) -> String {
        format!("/optimizer?session={}", self.session_id)
    }
}

/// Full page state for one reopened session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub record: SessionRecord,
    /// Which explanation sections to render; same rules as for a fresh
    /// pipeline result.
    pub flags: ExplanationFlags,
}

impl SessionView {
    pub fn from_record(record: SessionRecord) -> Self {
        let flags = record.explanation_flags();
        Self { record, flags }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_url() {
        let link = SessionLink::new("a1b2c3");
        assert_eq!(link.as_url(), "/optimizer?session=a1b2c3");
    }

    #[test]
    fn test_view_from_sparse_record() {
        // A record persisted by an older client: most nested payloads absent.
        let record: SessionRecord = serde_json::from_str(
            r#"{
                "id": "s1",
                "name": "Legacy",
                "optimization_level": "level1",
                "l1_changes": ["No rule-based optimizations applicable"]
            }"#,
        )
        .unwrap();

        let view = SessionView::from_record(record);
        assert!(view.flags.is_already_optimal);
        assert!(!view.flags.has_real_rule_changes);
        // Neutral defaults everywhere; rendering never hits an absent field.
        assert!(view.record.optimized_analysis.is_empty());
        assert!(view.record.l2.winning_model.is_empty());
        assert!(view.record.error_report.security.is_empty());
    }
}
