//! Skill traits.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{SkillDefinition, SkillInput, SkillOutput};

/// A concrete skill the orchestrator can route to.
#[async_trait]
pub trait Skill: Send + Sync {
    /// Unique skill id used in `invoke_skill` decisions.
    fn id(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Execute the skill. Must resolve or reject; never block indefinitely.
    async fn execute(&self, input: SkillInput) -> Result<SkillOutput>;
}

/// Registry of skills keyed by id.
#[async_trait]
pub trait SkillRegistry: Send + Sync {
    /// Register a new skill.
    async fn register(&self, skill: Arc<dyn Skill>) -> Result<()>;

    /// Get a skill by id.
    async fn get(&self, id: &str) -> Option<Arc<dyn Skill>>;

    /// List all registered skills.
    async fn list(&self) -> Vec<SkillDefinition>;

    /// Execute a skill by id.
    async fn execute(&self, id: &str, input: SkillInput) -> Result<SkillOutput>;
}
