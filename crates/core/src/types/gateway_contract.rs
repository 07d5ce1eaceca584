use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default model name shared by every reasoning and synthesis agent.
pub const DEFAULT_MODEL_FOR_AGENTS: &str = "mixtral-8x7b-32768";

// =============================================================================
// Request
// =============================================================================

/// A task-tagged request to the language-model Gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayRequest {
    /// Opaque task identifier, unique per agent lens.
    pub task: String,
    /// Task-specific payload.
    pub data: Value,
}

impl GatewayRequest {
    /// Create a request for an arbitrary payload.
    pub fn new(task: impl Into<String>, data: Value) -> Self {
        Self {
            task: task.into(),
            data,
        }
    }

    /// Create the request shape used by the reasoning and synthesis agents.
    pub fn prompted(
        task: impl Into<String>,
        system_prompt: impl Into<String>,
        user_query: impl Into<String>,
    ) -> Self {
        Self::new(
            task,
            serde_json::json!({
                "system_prompt": system_prompt.into(),
                "user_query": user_query.into(),
            }),
        )
    }

    /// The `system_prompt` field of the payload, if any.
    pub fn system_prompt(&self) -> Option<&str> {
        self.data.get("system_prompt").and_then(Value::as_str)
    }

    /// The `user_query` field of the payload, if any.
    pub fn user_query(&self) -> Option<&str> {
        self.data.get("user_query").and_then(Value::as_str)
    }
}

/// Per-call generation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_json_output: Option<bool>,
}

impl GenerationOptions {
    /// Options for a structured (JSON) call at the given temperature.
    pub fn json(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            max_tokens: None,
            is_json_output: Some(true),
        }
    }

    /// Whether structured output was requested.
    pub fn wants_json(&self) -> bool {
        self.is_json_output.unwrap_or(false)
    }
}

// =============================================================================
// Response
// =============================================================================

/// Token accounting reported by the Gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Response from the Gateway. Failures are values, never errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl GatewayResponse {
    /// A successful response carrying content.
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: Some(content.into()),
            error: None,
            usage: None,
        }
    }

    /// A failed response carrying an error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(error.into()),
            usage: None,
        }
    }

    /// Attach usage accounting.
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Content, but only when the call succeeded and produced something.
    pub fn usable_content(&self) -> Option<&str> {
        if !self.success {
            return None;
        }
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Human-readable reason this response cannot be used.
    pub fn failure_reason(&self) -> String {
        match (&self.error, self.success) {
            (Some(err), _) => err.clone(),
            (None, true) => "No content".to_string(),
            (None, false) => "Unknown gateway failure".to_string(),
        }
    }

    /// The audit string kept on agent records for a failed call.
    pub fn audit_text(&self) -> String {
        match &self.content {
            Some(content) if !content.is_empty() => content.clone(),
            _ => format!("Error: {}", self.failure_reason()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_wire_shape_is_camel_case() {
        let response = GatewayResponse::ok("{}").with_usage(TokenUsage {
            prompt_tokens: 3,
            completion_tokens: 4,
            total_tokens: 7,
        });
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["usage"]["promptTokens"], 3);
        assert_eq!(value["usage"]["totalTokens"], 7);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_usable_content_rejects_blank_and_failed() {
        assert_eq!(GatewayResponse::ok("  ").usable_content(), None);
        assert_eq!(GatewayResponse::failure("timeout").usable_content(), None);
        assert_eq!(GatewayResponse::ok("{\"a\":1}").usable_content(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_audit_text_prefers_content() {
        assert_eq!(GatewayResponse::failure("timeout").audit_text(), "Error: timeout");
        assert_eq!(GatewayResponse::ok("").audit_text(), "Error: No content");
    }

    #[test]
    fn test_prompted_request_payload() {
        let request = GatewayRequest::prompted("custom_analytical_analysis", "sys", "Help me.");
        assert_eq!(request.system_prompt(), Some("sys"));
        assert_eq!(request.user_query(), Some("Help me."));
    }
}
