//! Core traits for Atom NLU.
//!
//! Traits are organized by pipeline seam:
//! - `gateway`: the language-model Gateway capability
//! - `llm`: provider clients the Gateway implementations sit on
//! - `analyzer`: the coordinator contract the orchestrator depends on
//! - `skills`: skills and the registry routing dispatches into

pub mod analyzer;
pub mod gateway;
pub mod llm;
pub mod skills;

pub use analyzer::*;
pub use gateway::*;
pub use llm::*;
pub use skills::*;
