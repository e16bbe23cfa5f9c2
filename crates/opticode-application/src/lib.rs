//! opticode application layer.
//!
//! Orchestrates the core traits and infrastructure components into the
//! operations the UI pages call: recording runs, curating the library,
//! renaming and deleting with remote reconciliation, and the hydration
//! handoff across page navigations.

pub mod hydration;
pub mod session_usecase;

pub use hydration::{SessionLink, SessionView};
pub use session_usecase::SessionUseCase;
