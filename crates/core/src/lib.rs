//! Core types, traits, and error definitions for Atom NLU.
//!
//! This crate provides the contracts shared by every layer of the
//! multi-agent natural-language-understanding pipeline: the Gateway
//! request/response shapes, the per-lens agent records, the
//! `EnrichedIntent` decision object, and the skill contract consumed by the
//! orchestrator.

pub mod config;
pub mod decode;
pub mod error;
pub mod mocks;
pub mod template;
pub mod traits;
pub mod types;

pub use error::{DecodeError, Error, Result};
pub use traits::*;
pub use types::*;
