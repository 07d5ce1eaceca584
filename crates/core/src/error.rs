//! Error types for Atom NLU.

use thiserror::Error;

/// Result type alias using Atom's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Atom NLU.
///
/// Agents and the coordinator never surface these to their callers; they
/// degrade to typed fallback records instead. The variants below are used by
/// the registry, skill, configuration and template layers.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Gateway Errors
    // =========================================================================
    #[error("Model provider error: {0}")]
    ModelProvider(String),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    // =========================================================================
    // Agent Errors
    // =========================================================================
    #[error("Agent error: {0}")]
    Agent(String),

    // =========================================================================
    // Skill Errors
    // =========================================================================
    #[error("Skill not found: {0}")]
    SkillNotFound(String),

    #[error("Skill execution failed: {0}")]
    Skill(String),

    #[error("Knowledge base error: {0}")]
    Knowledge(String),

    // =========================================================================
    // Configuration & Template Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template hydration error: {0}")]
    Template(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create an agent error.
    pub fn agent(msg: impl Into<String>) -> Self {
        Self::Agent(msg.into())
    }

    /// Create a skill not found error.
    pub fn skill_not_found(id: impl Into<String>) -> Self {
        Self::SkillNotFound(id.into())
    }

    /// Create a skill execution error.
    pub fn skill(msg: impl Into<String>) -> Self {
        Self::Skill(msg.into())
    }

    /// Create a knowledge base error.
    pub fn knowledge(msg: impl Into<String>) -> Self {
        Self::Knowledge(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Failure of the strict decode step applied to generated content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("content is empty")]
    Empty,

    #[error("content is not valid JSON: {0}")]
    NotJson(String),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}
