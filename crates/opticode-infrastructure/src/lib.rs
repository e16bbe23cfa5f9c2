//! opticode infrastructure layer.
//!
//! Concrete substrates and clients behind the core traits: the in-memory
//! and durable file key-value stores, the dual-store session persistence,
//! the single-slot hydration handoff and the HTTP gateway client.

pub mod handoff_slot;
pub mod http_gateway;
pub mod json_file_store;
pub mod kv_session_store;
pub mod memory_store;
pub mod paths;

pub use crate::handoff_slot::HandoffSlot;
pub use crate::http_gateway::HttpSessionGateway;
pub use crate::json_file_store::JsonFileStore;
pub use crate::kv_session_store::KvSessionStore;
pub use crate::memory_store::MemoryStore;
pub use crate::paths::OpticodePaths;
