//! Metrics implementation using Prometheus.
//!
//! Every helper is a no-op until a recorder is installed.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use atom_core::{Error, Result};

/// Initialize Prometheus recorder and return the handle.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::internal(format!("Failed to install Prometheus recorder: {}", e)))?;

    tracing::info!("Prometheus metrics recorder initialized");
    Ok(handle)
}

/// Count one reasoning-agent run; `outcome` is `ok` or `degraded`.
pub fn track_agent_run(agent: &str, outcome: &'static str) {
    metrics::counter!(
        "nlu_agent_runs_total",
        "agent" => agent.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record Gateway latency for one task.
pub fn track_gateway_latency(task: &str, latency_sec: f64) {
    metrics::histogram!("nlu_gateway_latency_seconds", "task" => task.to_string()).record(latency_sec);
}

/// Helper to track token usage.
pub fn track_tokens(model: &str, prompt: u64, completion: u64) {
    metrics::counter!("llm_token_usage_total", "model" => model.to_string(), "type" => "prompt").increment(prompt);
    metrics::counter!("llm_token_usage_total", "model" => model.to_string(), "type" => "completion").increment(completion);
}

/// Count one orchestrator routing decision.
pub fn track_route(action_type: &str) {
    metrics::counter!("nlu_routes_total", "action_type" => action_type.to_string()).increment(1);
}
