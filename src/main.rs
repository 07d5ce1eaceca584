//! Atom NLU command line.
//!
//! Runs one utterance through the reasoning agents, synthesis and the
//! guidance orchestrator, then prints the reply.

use std::sync::Arc;

use clap::Parser;

use atom_agents::NluLeadAgent;
use atom_core::config::AppConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use atom_core::traits::SkillRegistry;
use atom_model_gateway::{create_gateway_from_config, export_api_keys, ProviderConfig};
use atom_orchestrator::GuidanceOrchestrator;
use atom_skills::create_default_registry;

#[derive(Parser)]
#[command(name = "atom-nlu", version, about = "Multi-agent natural language understanding")]
struct Cli {
    /// The utterance to analyze.
    utterance: String,

    /// User the request is made on behalf of.
    #[arg(long, default_value = "cli-user")]
    user_id: String,

    /// Application the user is working in, e.g. `SpreadsheetApp`.
    #[arg(long)]
    app: Option<String>,

    /// Print the full response, including the enriched intent, as JSON.
    #[arg(long)]
    json: bool,

    /// Use the offline gateway regardless of configured provider.
    #[arg(long)]
    offline: bool,

    /// Print Prometheus metrics to stderr after the request.
    #[arg(long)]
    metrics: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    atom_governance::configure_tracing(&config.logging)?;
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Failed to load configuration, using defaults");
    }

    if cli.offline {
        config.model_gateway.provider = "offline".into();
    }

    // Still single-threaded: safe to touch the environment.
    export_api_keys(&config.model_gateway);

    let metrics = if config.metrics.enabled || cli.metrics {
        Some(atom_governance::setup_metrics_recorder()?)
    } else {
        None
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli, config, metrics))
}

async fn run(cli: Cli, config: AppConfig, metrics: Option<PrometheusHandle>) -> anyhow::Result<()> {
    tracing::info!("Starting Atom NLU v{}", env!("CARGO_PKG_VERSION"));

    let providers = match config.model_gateway.providers_file.as_deref() {
        Some(path) => match ProviderConfig::load(path).await {
            Ok(providers) => Some(providers),
            Err(e) => {
                tracing::warn!(path, error = %e, "Ignoring provider catalogue");
                None
            }
        },
        None => None,
    };
    let gateway = create_gateway_from_config(&config.model_gateway, providers.as_ref());

    let lead = NluLeadAgent::from_config(gateway.clone(), &config.nlu);
    tracing::info!(agents = ?lead.kinds(), policy = ?lead.policy(), "NLU lead agent initialized");

    let registry = create_default_registry(gateway, &config.nlu.default_model, &config.skills).await?;
    tracing::info!(skills = registry.len(), "Skill registry initialized");
    for skill in registry.list().await {
        tracing::debug!(skill_id = %skill.id, description = %skill.description, "Registered skill");
    }

    let orchestrator =
        GuidanceOrchestrator::new(Arc::new(lead), Arc::new(registry)).with_config(&config.skills);

    let response = orchestrator
        .process_guidance_request(&cli.utterance, &cli.user_id, cli.app.as_deref())
        .await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.message_to_user);
    }

    if cli.metrics {
        if let Some(handle) = metrics {
            eprintln!("{}", handle.render());
        }
    }

    Ok(())
}
