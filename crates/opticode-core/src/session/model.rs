//! Session record domain model.
//!
//! A `SessionRecord` is one persisted optimization run: the code before and
//! after, the analysis of both revisions, the explanation payloads, and the
//! metadata (identity, label, timestamp) the persistence layer manages.

use crate::pipeline::{AiOutcome, CodeAnalysis, ErrorReport, ExplanationFlags, PipelineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which optimizer produced a run.
///
/// Wire values are `"none"`, `"level1"` (rule-based) and `"level2"`
/// (AI-based), matching the pipeline service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationLevel {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "level1")]
    RuleBased,
    #[serde(rename = "level2")]
    AiAssisted,
}

impl OptimizationLevel {
    pub fn is_rule_based(&self) -> bool {
        matches!(self, Self::RuleBased)
    }

    pub fn is_ai_assisted(&self) -> bool {
        matches!(self, Self::AiAssisted)
    }

    /// The wire value used by the pipeline service and the gateway.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::RuleBased => "level1",
            Self::AiAssisted => "level2",
        }
    }
}

impl std::fmt::Display for OptimizationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Numeric quality snapshot of one code revision.
///
/// Not independently mutable: replaced together with the code it measures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeMetrics {
    #[serde(default)]
    pub cyclomatic_complexity: u32,
    #[serde(default)]
    pub maintainability_index: f64,
    #[serde(default)]
    pub code_lines: u32,
    /// Effort-ratio estimate of the optimized code's speedup over the
    /// original; `1.0` when either side carries no measurement.
    #[serde(default)]
    pub speedup_estimate: f64,
}

impl CodeMetrics {
    /// Derives the snapshot for the optimized revision of a run.
    pub fn derive(original: &CodeAnalysis, optimized: &CodeAnalysis) -> Self {
        let speedup_estimate =
            if original.halstead.effort > 0.0 && optimized.halstead.effort > 0.0 {
                round2(original.halstead.effort / optimized.halstead.effort)
            } else {
                1.0
            };

        Self {
            cyclomatic_complexity: optimized.total_cyclomatic_complexity,
            maintainability_index: optimized.maintainability_index,
            code_lines: optimized.loc.code,
            speedup_estimate,
        }
    }
}

/// One persisted optimization run.
///
/// # Identity
///
/// `id` is empty until the record is first persisted; the persistence layer
/// assigns a collision-resistant token at that point and the id is immutable
/// thereafter. An id present in both the history and the library collection
/// refers to the same logical session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque identifier, unique across the union of both collections.
    #[serde(default)]
    pub id: String,
    /// User-visible label; defaults to `"Session-<id>"` on first save.
    #[serde(default)]
    pub name: String,
    /// Optimizer mode used for the run. Older payloads used the
    /// `optimization_level` key; both spellings deserialize.
    #[serde(default, alias = "optimization_level")]
    pub level: OptimizationLevel,

    #[serde(default)]
    pub original_code: String,
    #[serde(default)]
    pub optimized_code: String,

    #[serde(default)]
    pub original_analysis: CodeAnalysis,
    #[serde(default)]
    pub optimized_analysis: CodeAnalysis,

    /// One-line natural-language description of the run's outcome.
    #[serde(default)]
    pub summary: String,
    /// Combined display list of what changed, ordered for display and never
    /// deduplicated.
    #[serde(default)]
    pub changes: Vec<String>,
    /// Rule-optimizer change list, verbatim from the pipeline result.
    #[serde(default)]
    pub l1_changes: Vec<String>,
    /// AI-optimizer outcome, verbatim from the pipeline result.
    #[serde(default)]
    pub l2: AiOutcome,
    /// Check-gate report, including the structured optimizer findings.
    #[serde(default)]
    pub error_report: ErrorReport,

    /// Quality snapshot of the optimized revision.
    #[serde(default)]
    pub metrics: CodeMetrics,

    /// Save instant; listings sort on it, newest first. `None` until the
    /// record is first persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Builds an unsaved record from a pipeline result.
    ///
    /// The record carries no identity yet; `id`, the default `name` and
    /// `saved_at` are assigned by the persistence layer on first save.
    pub fn from_result(result: &PipelineResult) -> Self {
        let flags = ExplanationFlags::classify(result);

        let changes = if result.optimization_level.is_ai_assisted() {
            result.l2.changes_applied.clone()
        } else {
            result.l1_changes.clone()
        };

        let summary = if flags.has_real_ai_changes {
            format!(
                "AI optimization via {}: {} change(s) applied",
                result.l2.winning_model,
                result.l2.changes_applied.len()
            )
        } else if flags.has_real_rule_changes {
            format!(
                "Rule-based optimization: {} change(s) applied",
                result.l1_changes.len()
            )
        } else if flags.is_already_optimal {
            "No optimizations applicable; code is already optimal".to_string()
        } else {
            "Analysis only".to_string()
        };

        Self {
            id: String::new(),
            name: String::new(),
            level: result.optimization_level,
            original_code: result.original_code.clone(),
            optimized_code: result.optimized_code.clone(),
            original_analysis: result.original_analysis.clone(),
            optimized_analysis: result.optimized_analysis.clone(),
            summary,
            changes,
            l1_changes: result.l1_changes.clone(),
            l2: result.l2.clone(),
            error_report: result.error_report.clone(),
            metrics: CodeMetrics::derive(&result.original_analysis, &result.optimized_analysis),
            saved_at: None,
        }
    }

    /// Assigns identity and defaults in place, for first persistence.
    ///
    /// Idempotent: an id already carried (e.g. from a prior hydration) is
    /// never replaced, and an existing name and timestamp are kept.
    pub fn ensure_identity(&mut self) {
        if self.id.is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
        if self.name.trim().is_empty() {
            self.name = format!("Session-{}", self.id);
        }
        if self.saved_at.is_none() {
            self.saved_at = Some(Utc::now());
        }
    }

    /// Presentation flags for this record, same rules as for a fresh result.
    pub fn explanation_flags(&self) -> ExplanationFlags {
        ExplanationFlags::from_parts(&self.l1_changes, &self.l2, &self.error_report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_result(changes: &[&str]) -> PipelineResult {
        PipelineResult {
            optimization_level: OptimizationLevel::RuleBased,
            original_code: "total = 0\nfor x in xs:\n    total = total + x".to_string(),
            optimized_code: "total = sum(xs)".to_string(),
            l1_changes: changes.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ensure_identity_assigns_once() {
        let mut record = SessionRecord::from_result(&rule_result(&["Converted append-loop"]));
        assert!(record.id.is_empty());

        record.ensure_identity();
        let id = record.id.clone();
        assert!(!id.is_empty());
        assert_eq!(record.name, format!("Session-{id}"));
        assert!(record.saved_at.is_some());

        // A second pass must not reassign anything.
        let saved_at = record.saved_at;
        record.ensure_identity();
        assert_eq!(record.id, id);
        assert_eq!(record.saved_at, saved_at);
    }

    #[test]
    fn test_ensure_identity_keeps_user_name() {
        let mut record = SessionRecord {
            name: "My Fix".to_string(),
            ..Default::default()
        };
        record.ensure_identity();
        assert_eq!(record.name, "My Fix");
    }

    #[test]
    fn test_blank_name_is_defaulted() {
        let mut record = SessionRecord {
            name: "   ".to_string(),
            ..Default::default()
        };
        record.ensure_identity();
        assert!(record.name.starts_with("Session-"));
    }

    #[test]
    fn test_from_result_summary_and_changes() {
        let record = SessionRecord::from_result(&rule_result(&[
            "Converted append-loop to list comprehension",
            "Folded arithmetic identity (x + 0 → x)",
        ]));
        assert_eq!(record.summary, "Rule-based optimization: 2 change(s) applied");
        assert_eq!(record.changes, record.l1_changes);
        assert!(record.explanation_flags().has_real_rule_changes);
    }

    #[test]
    fn test_from_result_already_optimal() {
        let record = SessionRecord::from_result(&rule_result(&[
            "No rule-based optimizations applicable — code is already optimal",
        ]));
        assert!(record.explanation_flags().is_already_optimal);
        assert_eq!(
            record.summary,
            "No optimizations applicable; code is already optimal"
        );
    }

    #[test]
    fn test_level_alias_deserializes() {
        let json = r#"{ "optimization_level": "level1" }"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.level, OptimizationLevel::RuleBased);
    }

    #[test]
    fn test_metrics_speedup_defaults_to_one() {
        let metrics = CodeMetrics::derive(&CodeAnalysis::default(), &CodeAnalysis::default());
        assert_eq!(metrics.speedup_estimate, 1.0);
    }

    #[test]
    fn test_metrics_speedup_from_effort_ratio() {
        let mut original = CodeAnalysis::default();
        original.halstead.effort = 300.0;
        let mut optimized = CodeAnalysis::default();
        optimized.halstead.effort = 120.0;
        optimized.total_cyclomatic_complexity = 3;
        optimized.loc.code = 10;

        let metrics = CodeMetrics::derive(&original, &optimized);
        assert_eq!(metrics.speedup_estimate, 2.5);
        assert_eq!(metrics.cyclomatic_complexity, 3);
        assert_eq!(metrics.code_lines, 10);
    }
}
