//! Gateway implementations backed by provider clients.
//!
//! Both gateways map a task-tagged request to a system message and a user
//! message, and turn every provider error into a `success = false` response.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use atom_core::{
    traits::{ChatMessage, LanguageModelGateway, LlmClient, LlmResponse},
    types::{GatewayRequest, GatewayResponse, GenerationOptions},
    Result,
};

use crate::rig_client::{RigConfig, RigLlmClient, RigProvider};

/// The system and user messages for a request.
pub fn build_messages(request: &GatewayRequest) -> Vec<ChatMessage> {
    let system = request
        .system_prompt()
        .map(str::to_string)
        .unwrap_or_else(|| format!("You are an AI assistant. Perform the task: {}.", request.task));

    let user = request
        .user_query()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Data: {}", request.data));

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

fn into_response(task: &str, started: Instant, result: Result<LlmResponse>) -> GatewayResponse {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(resp) => {
            tracing::debug!(
                task = %task,
                elapsed_ms,
                total_tokens = resp.usage.total_tokens,
                "Gateway call succeeded"
            );
            GatewayResponse::ok(resp.content).with_usage(resp.usage)
        }
        Err(e) => {
            tracing::warn!(task = %task, elapsed_ms, error = %e, "Gateway call failed");
            GatewayResponse::failure(e.to_string())
        }
    }
}

// =============================================================================
// Rig Gateway
// =============================================================================

/// Gateway that builds a Rig client per request, honouring the requested
/// model and generation options.
pub struct RigGateway {
    provider: RigProvider,
    model_override: Option<String>,
    max_tokens: Option<u32>,
}

impl RigGateway {
    pub fn new(provider: RigProvider) -> Self {
        Self {
            provider,
            model_override: None,
            max_tokens: None,
        }
    }

    /// Ignore the model name agents ask for and always use this one.
    pub fn with_model_override(mut self, model: Option<String>) -> Self {
        self.model_override = model;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub(crate) fn config_for(&self, model: &str, options: GenerationOptions) -> RigConfig {
        let model = self.model_override.as_deref().unwrap_or(model);
        RigConfig::for_provider(self.provider, model)
            .with_temperature(options.temperature)
            .with_max_tokens(options.max_tokens.or(self.max_tokens))
            .with_json_output(options.wants_json())
    }
}

#[async_trait]
impl LanguageModelGateway for RigGateway {
    async fn generate(
        &self,
        request: &GatewayRequest,
        model: &str,
        options: GenerationOptions,
    ) -> GatewayResponse {
        let client = RigLlmClient::new(self.config_for(model, options));
        let started = Instant::now();
        let result = client.chat(&build_messages(request)).await;
        into_response(&request.task, started, result)
    }
}

// =============================================================================
// Client Gateway
// =============================================================================

/// Gateway over a fixed `LlmClient`. Model and options are left to the
/// client's own configuration.
pub struct ClientGateway {
    client: Arc<dyn LlmClient>,
}

impl ClientGateway {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LanguageModelGateway for ClientGateway {
    async fn generate(
        &self,
        request: &GatewayRequest,
        _model: &str,
        _options: GenerationOptions,
    ) -> GatewayResponse {
        let started = Instant::now();
        let result = self.client.chat(&build_messages(request)).await;
        into_response(&request.task, started, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atom_core::types::TokenUsage;
    use atom_core::Error;
    use serde_json::json;
    use std::sync::Mutex;

    struct EchoClient {
        seen: Mutex<Vec<Vec<ChatMessage>>>,
        fail: bool,
    }

    #[async_trait]
    impl LlmClient for EchoClient {
        async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
            self.chat(&[ChatMessage::user(prompt)]).await
        }

        async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse> {
            self.seen.lock().unwrap().push(messages.to_vec());
            if self.fail {
                return Err(Error::ModelProvider("rate limited".into()));
            }
            Ok(LlmResponse {
                content: "{\"ok\":true}".into(),
                finish_reason: "stop".into(),
                usage: TokenUsage {
                    prompt_tokens: 5,
                    completion_tokens: 3,
                    total_tokens: 8,
                },
            })
        }
    }

    fn echo(fail: bool) -> Arc<EchoClient> {
        Arc::new(EchoClient {
            seen: Mutex::new(Vec::new()),
            fail,
        })
    }

    #[test]
    fn test_messages_for_prompted_request() {
        let request = GatewayRequest::prompted("custom_practical_analysis", "Be practical.", "Help me.");
        let messages = build_messages(&request);

        assert_eq!(messages[0], ChatMessage::system("Be practical."));
        assert_eq!(messages[1], ChatMessage::user("Help me."));
    }

    #[test]
    fn test_messages_for_bare_payload() {
        let request = GatewayRequest::new("classify_guidance_query", json!({"query": "steps?"}));
        let messages = build_messages(&request);

        assert_eq!(
            messages[0].content,
            "You are an AI assistant. Perform the task: classify_guidance_query."
        );
        assert_eq!(messages[1].content, "Data: {\"query\":\"steps?\"}");
    }

    #[tokio::test]
    async fn test_client_gateway_success_carries_usage() {
        let client = echo(false);
        let gateway = ClientGateway::new(client.clone());

        let resp = gateway
            .generate(
                &GatewayRequest::prompted("t", "s", "u"),
                "m",
                GenerationOptions::json(0.3),
            )
            .await;

        assert!(resp.success);
        assert_eq!(resp.usage.unwrap().total_tokens, 8);
        assert_eq!(client.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_client_gateway_failure_is_a_value() {
        let gateway = ClientGateway::new(echo(true));

        let resp = gateway
            .generate(
                &GatewayRequest::prompted("t", "s", "u"),
                "m",
                GenerationOptions::default(),
            )
            .await;

        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("rate limited"));
    }

    #[test]
    fn test_rig_gateway_config_mapping() {
        let gateway = RigGateway::new(RigProvider::OpenAI)
            .with_model_override(Some("gpt-4o-mini".into()))
            .with_max_tokens(Some(512));
        let config = gateway.config_for("mixtral-8x7b-32768", GenerationOptions::json(0.8));

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, Some(0.8));
        assert_eq!(config.max_tokens, Some(512));
        assert!(config.json_output);
    }
}
