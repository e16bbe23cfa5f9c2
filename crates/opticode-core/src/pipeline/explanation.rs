//! Derived presentation flags for a pipeline result.
//!
//! The UI decides which explanation sections to render purely from these
//! booleans. Classification must stay deterministic and side-effect-free so
//! the rules can be unit-tested against literal fixture payloads.

use super::model::{AiOutcome, ErrorReport, PipelineResult};

/// Phrases the rule optimizer emits when it has nothing to change.
///
/// A change list consisting solely of these entries reports the *absence* of
/// change and must not be classified as one. Matching is case-insensitive
/// substring containment.
const NO_OP_SENTINELS: [&str; 2] = [
    "no rule-based optimizations applicable",
    "no applicable optimization",
];

fn is_sentinel(entry: &str) -> bool {
    let lowered = entry.trim().to_lowercase();
    NO_OP_SENTINELS
        .iter()
        .any(|sentinel| lowered.contains(sentinel))
}

/// UI-routing flags derived from one optimization result.
///
/// Each flag is evaluated independently; none of them mutates the source
/// document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplanationFlags {
    /// Security-findings list is non-empty.
    pub has_security_issues: bool,
    /// Runtime-risk list is non-empty.
    pub has_runtime_risks: bool,
    /// The rule-based change list holds at least one real (non-sentinel) change.
    pub has_real_rule_changes: bool,
    /// The rule-based change list exists solely to report the no-op sentinel.
    pub is_already_optimal: bool,
    /// The AI optimizer produced a winner with a non-empty applied-changes list.
    pub has_real_ai_changes: bool,
    /// The structured optimizer findings list is non-empty.
    pub has_optimizer_findings: bool,
    /// Any explanation section has content worth rendering.
    pub has_any_explanation: bool,
}

impl ExplanationFlags {
    /// Classifies a full pipeline result.
    pub fn classify(result: &PipelineResult) -> Self {
        Self::from_parts(&result.l1_changes, &result.l2, &result.error_report)
    }

    /// Classifies from the subset of fields a persisted session carries.
    ///
    /// Same rules as [`classify`](Self::classify); a hydrated record and a
    /// fresh result must never disagree on which sections render.
    pub fn from_parts(l1_changes: &[String], l2: &AiOutcome, report: &ErrorReport) -> Self {
        let has_security_issues = !report.security.is_empty();
        let has_runtime_risks = !report.runtime_risks.is_empty();

        let has_real_rule_changes =
            !l1_changes.is_empty() && !l1_changes.iter().all(|entry| is_sentinel(entry));
        let is_already_optimal = !l1_changes.is_empty() && !has_real_rule_changes;

        let has_real_ai_changes =
            !l2.winning_model.is_empty() && !l2.changes_applied.is_empty();

        let has_optimizer_findings = !report.optimization.findings.is_empty();

        let has_any_explanation = has_real_rule_changes
            || has_real_ai_changes
            || has_optimizer_findings
            || is_already_optimal;

        Self {
            has_security_issues,
            has_runtime_risks,
            has_real_rule_changes,
            is_already_optimal,
            has_real_ai_changes,
            has_optimizer_findings,
            has_any_explanation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::model::{OptimizationFinding, ReadinessReport};

    fn result_with_l1(changes: &[&str]) -> PipelineResult {
        PipelineResult {
            l1_changes: changes.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sentinel_only_list_is_not_a_change() {
        let result = result_with_l1(&["No rule-based optimizations applicable — code is already optimal"]);
        let flags = ExplanationFlags::classify(&result);
        assert!(!flags.has_real_rule_changes);
        assert!(flags.is_already_optimal);
        assert!(flags.has_any_explanation);
    }

    #[test]
    fn test_real_change_list() {
        let result = result_with_l1(&["Replaced manual loop with built-in sum"]);
        let flags = ExplanationFlags::classify(&result);
        assert!(flags.has_real_rule_changes);
        assert!(!flags.is_already_optimal);
        assert!(flags.has_any_explanation);
    }

    #[test]
    fn test_sentinel_match_is_case_insensitive() {
        let result = result_with_l1(&["NO RULE-BASED OPTIMIZATIONS APPLICABLE"]);
        let flags = ExplanationFlags::classify(&result);
        assert!(!flags.has_real_rule_changes);
        assert!(flags.is_already_optimal);
    }

    #[test]
    fn test_mixed_list_counts_as_real_change() {
        // One sentinel among real entries does not neutralize the list.
        let result = result_with_l1(&[
            "Folded arithmetic identity (x + 0 → x)",
            "No rule-based optimizations applicable",
        ]);
        let flags = ExplanationFlags::classify(&result);
        assert!(flags.has_real_rule_changes);
        assert!(!flags.is_already_optimal);
    }

    #[test]
    fn test_empty_rule_list_is_neither() {
        let flags = ExplanationFlags::classify(&PipelineResult::default());
        assert!(!flags.has_real_rule_changes);
        assert!(!flags.is_already_optimal);
        assert!(!flags.has_any_explanation);
    }

    #[test]
    fn test_ai_changes_require_winner_and_changes() {
        let mut result = PipelineResult::default();
        result.l2.changes_applied = vec!["Hoisted invariant computation".to_string()];
        // Applied changes without a winning model: stage produced no winner.
        assert!(!ExplanationFlags::classify(&result).has_real_ai_changes);

        result.l2.winning_model = "candidate-a".to_string();
        assert!(ExplanationFlags::classify(&result).has_real_ai_changes);

        result.l2.changes_applied.clear();
        assert!(!ExplanationFlags::classify(&result).has_real_ai_changes);
    }

    #[test]
    fn test_security_and_runtime_flags() {
        let mut result = PipelineResult::default();
        result.error_report.security = vec!["Forbidden function call: 'eval'".to_string()];
        result.error_report.runtime_risks =
            vec!["Infinite loop risk: 'while True' at line 3 has no break statement".to_string()];
        let flags = ExplanationFlags::classify(&result);
        assert!(flags.has_security_issues);
        assert!(flags.has_runtime_risks);
        // Neither contributes to has_any_explanation on its own.
        assert!(!flags.has_any_explanation);
    }

    #[test]
    fn test_optimizer_findings_flag() {
        let mut result = PipelineResult::default();
        result.error_report.optimization = ReadinessReport {
            optimizable: true,
            finding_count: 1,
            findings: vec![OptimizationFinding {
                kind: "nested_loop".to_string(),
                line: 7,
                name: None,
                suggestion: "Nested loops detected".to_string(),
            }],
        };
        let flags = ExplanationFlags::classify(&result);
        assert!(flags.has_optimizer_findings);
        assert!(flags.has_any_explanation);
    }

    #[test]
    fn test_classification_does_not_mutate() {
        let result = result_with_l1(&["Removed double negation (not not x → x)"]);
        let before = result.clone();
        let _ = ExplanationFlags::classify(&result);
        assert_eq!(result, before);
    }
}
