use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

use crate::types::DEFAULT_MODEL_FOR_AGENTS;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub nlu: NluConfig,
    pub skills: SkillsConfig,
    pub model_gateway: ModelGatewayConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NluConfig {
    pub default_model: String,
    pub temperatures: TemperatureConfig,
    /// Bound on every Gateway call; expiry counts as a Gateway failure.
    pub gateway_timeout_ms: u64,
    /// Domain specialists to run alongside the core lenses.
    pub specialists: Vec<String>,
    pub partial_failure: PartialFailurePolicy,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct TemperatureConfig {
    pub analytical: f32,
    pub creative: f32,
    pub practical: f32,
    pub specialist: f32,
    pub synthesis: f32,
}

/// What the coordinator does when some reasoning agents degrade.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PartialFailurePolicy {
    /// Synthesize with whatever was collected, `null` for missing lenses.
    #[default]
    Proceed,
    /// Skip synthesis unless at least `min_healthy` agents produced a real
    /// analysis.
    RequireQuorum { min_healthy: usize },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SkillsConfig {
    /// Skill used when a decision names no skill or an unknown one.
    pub fallback_skill_id: String,
    pub skill_timeout_ms: u64,
    pub max_knowledge_results: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelGatewayConfig {
    /// `openai`, `anthropic`, or `offline`.
    pub provider: String,
    /// Model sent to the provider when the catalogue has no entry for it.
    /// Unset means the provider's default model.
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub providers_file: Option<String>,

    pub openai_api_key: Option<Secret<String>>,
    pub anthropic_api_key: Option<Secret<String>>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ATOM_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map ATOM__NLU__GATEWAY_TIMEOUT_MS=5000 to nlu.gateway_timeout_ms
            .add_source(Environment::with_prefix("ATOM").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL_FOR_AGENTS.into(),
            temperatures: TemperatureConfig::default(),
            gateway_timeout_ms: 30_000,
            specialists: vec![],
            partial_failure: PartialFailurePolicy::Proceed,
        }
    }
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            analytical: 0.2,
            creative: 0.8,
            practical: 0.5,
            specialist: 0.5,
            synthesis: 0.3,
        }
    }
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            fallback_skill_id: "LearningAndGuidanceSkill".into(),
            skill_timeout_ms: 30_000,
            max_knowledge_results: 3,
        }
    }
}

impl Default for ModelGatewayConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: None,
            max_tokens: Some(1024),
            providers_file: None,
            openai_api_key: None,
            anthropic_api_key: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,atom=debug".into(),
            json: false,
        }
    }
}
