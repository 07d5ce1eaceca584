//! Rig LLM client adapter.
//!
//! Wraps Rig's Agent for integration with our LlmClient trait.

use async_trait::async_trait;

use atom_core::{
    traits::{ChatMessage, ChatRole, LlmClient, LlmResponse},
    types::TokenUsage,
    Error, Result,
};

use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;

const JSON_ONLY_INSTRUCTION: &str =
    "Respond with a single valid JSON object only. Do not wrap it in Markdown or add commentary.";

/// Provider type for Rig clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigProvider {
    OpenAI,
    Anthropic,
}

impl RigProvider {
    /// Environment variable holding the provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            RigProvider::OpenAI => "OPENAI_API_KEY",
            RigProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Name used in configuration and the provider catalogue.
    pub fn name(&self) -> &'static str {
        match self {
            RigProvider::OpenAI => "openai",
            RigProvider::Anthropic => "anthropic",
        }
    }

    /// Parse a configured provider name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "openai" => Some(RigProvider::OpenAI),
            "anthropic" => Some(RigProvider::Anthropic),
            _ => None,
        }
    }

    /// Model used when neither the catalogue nor configuration names one.
    pub fn default_model(&self) -> &'static str {
        match self {
            RigProvider::OpenAI => "gpt-4o-mini",
            RigProvider::Anthropic => "claude-3-haiku-20240307",
        }
    }

    /// Whether the API key is present in the environment.
    pub fn has_api_key(&self) -> bool {
        std::env::var(self.api_key_var()).is_ok()
    }
}

/// Configuration for one Rig call.
#[derive(Debug, Clone)]
pub struct RigConfig {
    pub provider: RigProvider,
    pub model: String,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Append a JSON-only instruction to the preamble.
    pub json_output: bool,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            provider: RigProvider::OpenAI,
            model: "gpt-4o-mini".to_string(),
            system_prompt: None,
            temperature: None,
            max_tokens: Some(1024),
            json_output: false,
        }
    }
}

impl RigConfig {
    /// Create config for OpenAI.
    pub fn openai(model: impl Into<String>) -> Self {
        Self {
            provider: RigProvider::OpenAI,
            model: model.into(),
            ..Default::default()
        }
    }

    /// Create config for Anthropic.
    pub fn anthropic(model: impl Into<String>) -> Self {
        Self {
            provider: RigProvider::Anthropic,
            model: model.into(),
            ..Default::default()
        }
    }

    /// Create config for a provider.
    pub fn for_provider(provider: RigProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temp: Option<f32>) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_json_output(mut self, json: bool) -> Self {
        self.json_output = json;
        self
    }

    /// The preamble sent to the provider.
    fn preamble(&self) -> Option<String> {
        match (&self.system_prompt, self.json_output) {
            (Some(system), true) => Some(format!("{}\n\n{}", system, JSON_ONLY_INSTRUCTION)),
            (Some(system), false) => Some(system.clone()),
            (None, true) => Some(JSON_ONLY_INSTRUCTION.to_string()),
            (None, false) => None,
        }
    }
}

/// Rig-based LLM client.
pub struct RigLlmClient {
    config: RigConfig,
}

impl RigLlmClient {
    pub fn new(config: RigConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    /// Build messages into a single prompt. System messages are carried by
    /// the preamble, so only the conversational turns are rendered here.
    fn build_prompt(&self, messages: &[ChatMessage]) -> String {
        let mut prompt = String::new();

        for msg in messages {
            match msg.role {
                ChatRole::System => {}
                ChatRole::User => prompt.push_str(&format!("{}\n\n", msg.content)),
                ChatRole::Assistant => prompt.push_str(&format!("Assistant: {}\n\n", msg.content)),
            }
        }

        prompt.trim_end().to_string()
    }

    /// Fold system messages into a config copy for this call.
    fn config_for(&self, messages: &[ChatMessage]) -> RigConfig {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == ChatRole::System)
            .map(|m| m.content.as_str())
            .collect();

        let mut config = self.config.clone();
        if !system.is_empty() {
            config.system_prompt = Some(system.join("\n\n"));
        }
        config
    }

    async fn call_openai(config: &RigConfig, prompt: &str) -> Result<String> {
        use rig::providers::openai;

        if !RigProvider::OpenAI.has_api_key() {
            return Err(Error::ModelProvider("OPENAI_API_KEY not set".to_string()));
        }

        let client = openai::Client::from_env();
        let mut builder = client.agent(&config.model);
        if let Some(preamble) = config.preamble() {
            builder = builder.preamble(&preamble);
        }
        if let Some(temp) = config.temperature {
            builder = builder.temperature(temp as f64);
        }
        if let Some(max_tokens) = config.max_tokens {
            builder = builder.max_tokens(max_tokens as u64);
        }

        builder
            .build()
            .prompt(prompt)
            .await
            .map_err(|e| Error::ModelProvider(format!("OpenAI error: {}", e)))
    }

    async fn call_anthropic(config: &RigConfig, prompt: &str) -> Result<String> {
        use rig::providers::anthropic;

        if !RigProvider::Anthropic.has_api_key() {
            return Err(Error::ModelProvider("ANTHROPIC_API_KEY not set".to_string()));
        }

        let client = anthropic::Client::from_env();
        let mut builder = client.agent(&config.model);
        if let Some(preamble) = config.preamble() {
            builder = builder.preamble(&preamble);
        }
        if let Some(temp) = config.temperature {
            builder = builder.temperature(temp as f64);
        }
        // Anthropic requires max_tokens on every request.
        builder = builder.max_tokens(config.max_tokens.unwrap_or(1024) as u64);

        builder
            .build()
            .prompt(prompt)
            .await
            .map_err(|e| Error::ModelProvider(format!("Anthropic error: {}", e)))
    }

    async fn run(config: &RigConfig, prompt: &str) -> Result<LlmResponse> {
        tracing::debug!(
            provider = ?config.provider,
            model = %config.model,
            prompt_len = prompt.len(),
            json = config.json_output,
            "Calling LLM"
        );

        let content = match config.provider {
            RigProvider::OpenAI => Self::call_openai(config, prompt).await?,
            RigProvider::Anthropic => Self::call_anthropic(config, prompt).await?,
        };

        // Rig's prompt API does not surface usage; estimate at ~4 chars per token.
        let prompt_tokens = (prompt.len() / 4) as u64;
        let completion_tokens = (content.len() / 4) as u64;

        Ok(LlmResponse {
            content,
            finish_reason: "stop".to_string(),
            usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
        })
    }
}

#[async_trait]
impl LlmClient for RigLlmClient {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        Self::run(&self.config, prompt).await
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse> {
        let config = self.config_for(messages);
        let prompt = self.build_prompt(messages);
        Self::run(&config, &prompt).await
    }
}

/// Pick a provider based on available API keys.
pub fn detect_provider() -> Option<RigProvider> {
    [RigProvider::OpenAI, RigProvider::Anthropic]
        .into_iter()
        .find(|p| p.has_api_key())
}
