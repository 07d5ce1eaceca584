//! Core type definitions for Atom NLU.
//!
//! Broken down into submodules by pipeline stage.

pub mod agent;
pub mod gateway_contract;
pub mod input;
pub mod intent;
pub mod skill;

pub use agent::*;
pub use gateway_contract::*;
pub use input::*;
pub use intent::*;
pub use skill::*;
