//! Pipeline result document model.
//!
//! Mirrors the JSON document returned by the analysis/optimization service.
//! Every nested payload defaults so a partial document (an aborted run, an
//! older service version) still deserializes; rendering code never has to
//! dereference an absent field.

use crate::session::OptimizationLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Line-count breakdown for a source file or a single function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocReport {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub blank: u32,
    #[serde(default)]
    pub comment: u32,
    #[serde(default)]
    pub code: u32,
}

/// Halstead software-science measures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HalsteadReport {
    #[serde(default)]
    pub distinct_operators: u32,
    #[serde(default)]
    pub distinct_operands: u32,
    #[serde(default)]
    pub total_operators: u32,
    #[serde(default)]
    pub total_operands: u32,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default)]
    pub effort: f64,
    #[serde(default)]
    pub time_to_program: f64,
    #[serde(default)]
    pub bugs_delivered: f64,
}

/// Per-function analysis entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionAnalysis {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub time_complexity: String,
    #[serde(default)]
    pub space_complexity: String,
    #[serde(default)]
    pub cyclomatic_complexity: u32,
    #[serde(default)]
    pub loc: LocReport,
    #[serde(default)]
    pub halstead: HalsteadReport,
    #[serde(default)]
    pub maintainability_index: f64,
    #[serde(default)]
    pub mi_label: String,
}

/// Static-analysis snapshot of one code revision.
///
/// Produced once for the original code and once for the optimized code; a
/// run that changed nothing reports the same analysis for both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeAnalysis {
    #[serde(default)]
    pub loc: LocReport,
    #[serde(default)]
    pub halstead: HalsteadReport,
    #[serde(default)]
    pub functions: Vec<FunctionAnalysis>,
    #[serde(default)]
    pub total_cyclomatic_complexity: u32,
    #[serde(default)]
    pub maintainability_index: f64,
    #[serde(default)]
    pub mi_label: String,
    /// Count of functions per estimated complexity class, e.g. `{"O(n)": 2}`.
    #[serde(default)]
    pub big_o_distribution: HashMap<String, u32>,
}

impl CodeAnalysis {
    /// True when this analysis carries no data (aborted run, legacy record).
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.loc.total == 0
    }
}

/// Result of the language-identification gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCheck {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub reason: String,
}

/// One structure the readiness scan flagged as having optimization potential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationFinding {
    /// Finding kind, e.g. `nested_loop`, `large_function`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub line: u32,
    /// Function name, when the finding targets one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub suggestion: String,
}

/// Structured optimization-readiness report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    #[serde(default)]
    pub optimizable: bool,
    #[serde(default)]
    pub finding_count: u32,
    #[serde(default)]
    pub findings: Vec<OptimizationFinding>,
}

/// Unified report of the pre-optimization check gates.
///
/// `aborted` is set when the language or syntax gate rejected the code; the
/// remaining lists are surfaced as warnings and do not block a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    #[serde(default)]
    pub language: LanguageCheck,
    /// `"OK"` or the syntax error message.
    #[serde(default)]
    pub syntax: String,
    #[serde(default)]
    pub security: Vec<String>,
    #[serde(default)]
    pub runtime_risks: Vec<String>,
    #[serde(default)]
    pub optimization: ReadinessReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

/// One candidate model in the AI optimizer's ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedModel {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub score: f64,
}

/// Outcome of the AI (level-2) optimizer.
///
/// An empty `winning_model` means the AI stage did not run or produced no
/// usable candidate; the classifier treats such an outcome as "no AI
/// changes" regardless of the other fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiOutcome {
    #[serde(default)]
    pub winning_model: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub confidence: f64,
    /// `low` | `medium` | `high`
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub changes_applied: Vec<String>,
    #[serde(default)]
    pub additional_suggestions: Vec<String>,
    #[serde(default)]
    pub ranked_models: Vec<RankedModel>,
    #[serde(default)]
    pub syntax_valid: bool,
}

/// The full result document of one optimization run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    // Stage flags
    #[serde(default)]
    pub passed_error_check: bool,
    #[serde(default)]
    pub passed_complexity: bool,
    #[serde(default)]
    pub optimization_ran: bool,

    // Stage payloads
    #[serde(default)]
    pub error_report: ErrorReport,
    #[serde(default)]
    pub original_analysis: CodeAnalysis,
    #[serde(default)]
    pub optimized_analysis: CodeAnalysis,

    // Code
    #[serde(default)]
    pub original_code: String,
    #[serde(default)]
    pub optimized_code: String,
    #[serde(default)]
    pub optimization_level: OptimizationLevel,

    // Level 1 metadata
    #[serde(default)]
    pub l1_changes: Vec<String>,

    // Level 2 metadata
    #[serde(default)]
    pub l2: AiOutcome,

    /// Top-level abort error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_deserializes() {
        // An aborted run carries only the error report and the code.
        let json = r#"{
            "original_code": "x = 1",
            "error_report": { "aborted": "Code rejected: syntax errors present." }
        }"#;
        let result: PipelineResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.original_code, "x = 1");
        assert_eq!(
            result.error_report.aborted.as_deref(),
            Some("Code rejected: syntax errors present.")
        );
        assert!(result.l1_changes.is_empty());
        assert!(result.l2.winning_model.is_empty());
        assert!(result.optimized_analysis.is_empty());
    }

    #[test]
    fn test_finding_kind_wire_name() {
        let json = r#"{ "type": "nested_loop", "line": 4, "suggestion": "review" }"#;
        let finding: OptimizationFinding = serde_json::from_str(json).unwrap();
        assert_eq!(finding.kind, "nested_loop");
        let back = serde_json::to_value(&finding).unwrap();
        assert_eq!(back["type"], "nested_loop");
        assert!(back.get("name").is_none());
    }

    #[test]
    fn test_full_wire_document() {
        let json = r#"{
            "passed_error_check": true,
            "passed_complexity": true,
            "optimization_ran": true,
            "error_report": {
                "language": { "valid": true, "reason": "ok" },
                "syntax": "OK",
                "security": ["Forbidden import: 'os'"],
                "runtime_risks": [],
                "optimization": {
                    "optimizable": true,
                    "finding_count": 1,
                    "findings": [
                        { "type": "large_function", "line": 2, "name": "main",
                          "suggestion": "'main' has 20 statements" }
                    ]
                }
            },
            "original_code": "def f(): pass",
            "optimized_code": "def f(): pass",
            "optimization_level": "level2",
            "l1_changes": [],
            "l2": {
                "winning_model": "candidate-a",
                "score": 0.81,
                "confidence": 0.9,
                "risk": "low",
                "changes_applied": ["Hoisted invariant computation"],
                "additional_suggestions": [],
                "ranked_models": [{ "model": "candidate-a", "score": 0.81 }],
                "syntax_valid": true
            }
        }"#;
        let result: PipelineResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.optimization_level, OptimizationLevel::AiAssisted);
        assert_eq!(result.error_report.optimization.findings.len(), 1);
        assert_eq!(
            result.error_report.optimization.findings[0].name.as_deref(),
            Some("main")
        );
        assert_eq!(result.l2.ranked_models[0].model, "candidate-a");
    }
}
