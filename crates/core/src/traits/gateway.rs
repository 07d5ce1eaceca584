//! Language-model Gateway trait.

use async_trait::async_trait;

use crate::types::{GatewayRequest, GatewayResponse, GenerationOptions};

/// The external generation capability every agent depends on.
///
/// Implementations never return errors: provider failures, transport errors
/// and missing content are reported as `success = false` responses.
#[async_trait]
pub trait LanguageModelGateway: Send + Sync {
    /// Run one task-tagged generation.
    async fn generate(
        &self,
        request: &GatewayRequest,
        model: &str,
        options: GenerationOptions,
    ) -> GatewayResponse;
}
