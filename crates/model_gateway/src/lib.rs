//! Model Gateway for Atom NLU.
//!
//! This crate provides:
//! - Rig LLM client adapter
//! - Gateway implementations over Rig or any fixed `LlmClient`
//! - An offline canned gateway for running without provider keys
//! - Provider catalogue loading

pub mod config;
pub mod gateway;
pub mod offline;
pub mod rig_client;

pub use config::ProviderConfig;
pub use gateway::{build_messages, ClientGateway, RigGateway};
pub use offline::OfflineGateway;
pub use rig_client::{detect_provider, RigConfig, RigLlmClient, RigProvider};

use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;

use atom_core::config::ModelGatewayConfig;
use atom_core::traits::LanguageModelGateway;

/// Make configured API keys visible to Rig, which reads them from the
/// environment. Keys already set in the environment win.
///
/// Mutates the process environment, so call it before starting the async
/// runtime or any other thread.
pub fn export_api_keys(config: &ModelGatewayConfig) {
    export_api_key(RigProvider::OpenAI, config.openai_api_key.as_ref());
    export_api_key(RigProvider::Anthropic, config.anthropic_api_key.as_ref());
}

fn export_api_key(provider: RigProvider, key: Option<&Secret<String>>) {
    if provider.has_api_key() {
        return;
    }
    if let Some(key) = key {
        std::env::set_var(provider.api_key_var(), key.expose_secret());
    }
}

/// Create the Gateway described by configuration.
///
/// API keys are read from the environment; see [`export_api_keys`]. Falls
/// back to [`OfflineGateway`] when the provider is `offline` or no API key
/// is available for it.
pub fn create_gateway_from_config(
    config: &ModelGatewayConfig,
    providers: Option<&ProviderConfig>,
) -> Arc<dyn LanguageModelGateway> {
    let provider = match RigProvider::from_name(&config.provider) {
        Some(p) if p.has_api_key() => Some(p),
        Some(p) => {
            tracing::warn!(provider = ?p, "No API key for configured provider");
            detect_provider()
        }
        None => None,
    };

    match provider {
        Some(provider) => Arc::new(rig_gateway(config, providers, provider)),
        None => {
            tracing::info!(provider = %config.provider, "Using offline gateway");
            Arc::new(OfflineGateway::new())
        }
    }
}

/// Build the Rig gateway for a selected provider.
///
/// Agents ask for their own model name, which the hosted providers do not
/// serve, so the gateway always pins one: the catalogue's first model for
/// the provider, else `config.model` when it was written for this provider,
/// else the provider default.
pub fn rig_gateway(
    config: &ModelGatewayConfig,
    providers: Option<&ProviderConfig>,
    provider: RigProvider,
) -> RigGateway {
    let catalogued = providers.and_then(|p| p.first_model(provider.name()));
    let configured = config
        .model
        .as_deref()
        .filter(|_| RigProvider::from_name(&config.provider) == Some(provider));

    let model = catalogued
        .map(|m| m.id.as_str())
        .or(configured)
        .unwrap_or(provider.default_model());
    let max_tokens = catalogued.and_then(|m| m.max_tokens).or(config.max_tokens);

    tracing::info!(provider = ?provider, model, "Using Rig gateway");

    RigGateway::new(provider)
        .with_model_override(Some(model.to_string()))
        .with_max_tokens(max_tokens)
}
