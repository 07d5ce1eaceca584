//! Guidance orchestrator for Atom NLU.
//!
//! Turns an `EnrichedIntent` into exactly one terminal outcome: a
//! clarification question, a skill invocation, or a summary. Every outcome
//! carries a user-facing message.

pub mod orchestrator;
pub mod routing;

pub use orchestrator::{GuidanceOrchestrator, OrchestratorResponse};
pub use routing::{guidance_hint, RoutingState, CLARIFY_FALLBACK};
