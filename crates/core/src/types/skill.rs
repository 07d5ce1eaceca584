use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Skill contract (consumed by the orchestrator)
// =============================================================================

/// Input handed to a skill after routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInput {
    pub user_id: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance_type_hint: Option<String>,
    /// Parameters extracted during synthesis.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
}

impl SkillInput {
    /// Create an input for a user query.
    pub fn new(user_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            query: query.into(),
            application_context: None,
            guidance_type_hint: None,
            parameters: Map::new(),
        }
    }

    /// Set the application the user is working in.
    pub fn with_application_context(mut self, context: Option<String>) -> Self {
        self.application_context = context;
        self
    }

    /// Set a guidance type hint.
    pub fn with_guidance_type_hint(mut self, hint: Option<String>) -> Self {
        self.guidance_type_hint = hint;
        self
    }

    /// Set the synthesized parameters.
    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Output of a skill execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillOutput {
    /// User-facing message rendered by the skill.
    pub message: String,
    /// Skill-specific structured result.
    #[serde(default)]
    pub data: Value,
}

impl SkillOutput {
    /// Create a plain text output.
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: Value::Null,
        }
    }

    /// Attach structured data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Registry listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub id: String,
    pub description: String,
}
