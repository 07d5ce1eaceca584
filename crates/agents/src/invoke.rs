//! Bounded, cancellable Gateway invocation shared by every agent.

use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use atom_core::config::NluConfig;
use atom_core::traits::LanguageModelGateway;
use atom_core::types::{GatewayRequest, GatewayResponse, GenerationOptions};
use atom_governance::{track_gateway_latency, track_tokens};

/// Per-agent call settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl AgentSettings {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Settings for a call at `temperature` using the configured model and
    /// timeout.
    pub fn from_config(config: &NluConfig, temperature: f32) -> Self {
        Self::new(config.default_model.clone(), temperature)
            .with_timeout(Duration::from_millis(config.gateway_timeout_ms))
    }
}

/// Run one Gateway call in structured-output mode.
///
/// Expiry of `settings.timeout` and cancellation of `cancel` both come back
/// as failure responses, exactly like a provider error.
pub async fn invoke_gateway(
    gateway: &dyn LanguageModelGateway,
    request: &GatewayRequest,
    settings: &AgentSettings,
    cancel: &CancellationToken,
) -> GatewayResponse {
    if cancel.is_cancelled() {
        return GatewayResponse::failure("cancelled");
    }

    let started = Instant::now();
    let options = GenerationOptions::json(settings.temperature);
    let call = tokio::time::timeout(
        settings.timeout,
        gateway.generate(request, &settings.model, options),
    );

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => GatewayResponse::failure("cancelled"),
        outcome = call => match outcome {
            Ok(response) => response,
            Err(_) => GatewayResponse::failure(format!(
                "timeout after {}ms",
                settings.timeout.as_millis()
            )),
        },
    };

    let elapsed = started.elapsed();
    track_gateway_latency(&request.task, elapsed.as_secs_f64());
    if let Some(usage) = response.usage {
        track_tokens(&settings.model, usage.prompt_tokens, usage.completion_tokens);
    }

    tracing::debug!(
        task = %request.task,
        success = response.success,
        elapsed_ms = elapsed.as_millis() as u64,
        "Gateway call finished"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use atom_core::mocks::ScriptedGateway;

    struct SlowGateway(Duration);

    #[async_trait]
    impl LanguageModelGateway for SlowGateway {
        async fn generate(
            &self,
            _request: &GatewayRequest,
            _model: &str,
            _options: GenerationOptions,
        ) -> GatewayResponse {
            tokio::time::sleep(self.0).await;
            GatewayResponse::ok("{}")
        }
    }

    fn request() -> GatewayRequest {
        GatewayRequest::prompted("custom_analytical_analysis", "sys", "Help me.")
    }

    #[tokio::test]
    async fn test_passes_model_and_json_options() {
        let gateway = ScriptedGateway::new().with_content("custom_analytical_analysis", "{}");
        let settings = AgentSettings::new("mixtral-8x7b-32768", 0.2);

        let resp = invoke_gateway(&gateway, &request(), &settings, &CancellationToken::new()).await;

        assert!(resp.success);
        let call = &gateway.calls()[0];
        assert_eq!(call.model, "mixtral-8x7b-32768");
        assert_eq!(call.options.temperature, Some(0.2));
        assert!(call.options.wants_json());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_failure() {
        let gateway = SlowGateway(Duration::from_secs(60));
        let settings = AgentSettings::new("m", 0.5).with_timeout(Duration::from_millis(250));

        let resp = invoke_gateway(&gateway, &request(), &settings, &CancellationToken::new()).await;

        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("timeout after 250ms"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_becomes_failure() {
        let gateway = SlowGateway(Duration::from_secs(60));
        let settings = AgentSettings::new("m", 0.5);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let resp = invoke_gateway(&gateway, &request(), &settings, &cancel).await;
        assert_eq!(resp.error.as_deref(), Some("cancelled"));
    }
}
