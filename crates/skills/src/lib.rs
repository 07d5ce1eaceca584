//! Skills for Atom NLU.
//!
//! This crate provides:
//! - Skill registry keyed by skill id
//! - Knowledge base with keyword-scored search
//! - Learning & Guidance skill, the fallback for unrouted requests

pub mod guidance;
pub mod knowledge;
pub mod registry;

pub use guidance::{
    GuidanceItem, GuidanceResult, GuidanceType, LearningAndGuidanceSkill, LEARNING_AND_GUIDANCE_SKILL_ID,
};
pub use knowledge::{default_articles, Article, ArticleStep, InMemoryKnowledgeBase, KnowledgeBase, SearchRequest};
pub use registry::{create_default_registry, DefaultSkillRegistry};
