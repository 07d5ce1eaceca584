//! Observability for Atom NLU.
//!
//! This crate provides:
//! - Tracing subscriber setup
//! - Prometheus metrics helpers

pub mod metrics;
pub mod tracing_layer;

pub use metrics::{
    setup_metrics_recorder, track_agent_run, track_gateway_latency, track_route, track_tokens,
};
pub use tracing_layer::configure_tracing;
