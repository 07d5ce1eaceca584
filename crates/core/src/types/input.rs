use serde::{Deserialize, Serialize};

/// The immutable per-request input handed to every reasoning agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAgentInput {
    /// Raw user utterance.
    pub user_input: String,
    /// Optional identity used for context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl SubAgentInput {
    /// Create an input for an anonymous utterance.
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            user_id: None,
        }
    }

    /// Attach a user id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// The user id, or `N/A` for prompt interpolation.
    pub fn user_id_or_na(&self) -> &str {
        self.user_id.as_deref().unwrap_or("N/A")
    }
}
