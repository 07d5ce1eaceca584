//! Skill registry implementation.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use atom_core::{
    config::SkillsConfig,
    traits::{LanguageModelGateway, Skill, SkillRegistry},
    types::{SkillDefinition, SkillInput, SkillOutput},
    Error, Result,
};

use crate::guidance::LearningAndGuidanceSkill;
use crate::knowledge::InMemoryKnowledgeBase;

/// Default skill registry using DashMap.
pub struct DefaultSkillRegistry {
    /// Registered skills by id.
    skills: DashMap<String, Arc<dyn Skill>>,
}

impl DefaultSkillRegistry {
    /// Create an empty skill registry.
    pub fn new() -> Self {
        Self {
            skills: DashMap::new(),
        }
    }

    /// Get the number of registered skills.
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl Default for DefaultSkillRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SkillRegistry for DefaultSkillRegistry {
    async fn register(&self, skill: Arc<dyn Skill>) -> Result<()> {
        let id = skill.id().to_string();
        tracing::info!(skill_id = %id, "Registering skill");

        if self.skills.contains_key(&id) {
            return Err(Error::skill(format!("Skill '{}' is already registered", id)));
        }

        self.skills.insert(id, skill);
        Ok(())
    }

    async fn get(&self, id: &str) -> Option<Arc<dyn Skill>> {
        self.skills.get(id).map(|entry| entry.value().clone())
    }

    async fn list(&self) -> Vec<SkillDefinition> {
        let mut definitions: Vec<_> = self
            .skills
            .iter()
            .map(|entry| SkillDefinition {
                id: entry.value().id().to_string(),
                description: entry.value().description().to_string(),
            })
            .collect();
        definitions.sort_by(|a, b| a.id.cmp(&b.id));
        definitions
    }

    async fn execute(&self, id: &str, input: SkillInput) -> Result<SkillOutput> {
        // Clone out of the map so no shard lock is held across the await.
        let skill = self
            .skills
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::skill_not_found(id))?;

        tracing::debug!(skill_id = %id, "Executing skill");

        skill.execute(input).await
    }
}

/// Create a registry holding the built-in skills.
pub async fn create_default_registry(
    gateway: Arc<dyn LanguageModelGateway>,
    model: &str,
    config: &SkillsConfig,
) -> Result<DefaultSkillRegistry> {
    let registry = DefaultSkillRegistry::new();

    let guidance = LearningAndGuidanceSkill::new(gateway, Arc::new(InMemoryKnowledgeBase::default()))
        .with_model(model)
        .with_max_results(config.max_knowledge_results);
    registry.register(Arc::new(guidance)).await?;

    Ok(registry)
}
