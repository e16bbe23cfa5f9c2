//! Optimization-pipeline result documents.
//!
//! The optimization engines are remote collaborators; what reaches this
//! layer is their JSON result document. This module owns that document's
//! shape and the pure classification logic that turns it into UI-routing
//! flags.
//!
//! # Module Structure
//!
//! - `model`: the result document (`PipelineResult`) and its nested payloads
//! - `explanation`: derived presentation flags (`ExplanationFlags`)

mod explanation;
mod model;

pub use explanation::ExplanationFlags;
pub use model::{
    AiOutcome, CodeAnalysis, ErrorReport, FunctionAnalysis, HalsteadReport, LanguageCheck,
    LocReport, OptimizationFinding, PipelineResult, RankedModel, ReadinessReport,
};
