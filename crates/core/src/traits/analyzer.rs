//! Intent analysis trait.

use async_trait::async_trait;

use crate::types::{EnrichedIntent, SubAgentInput};

/// Produces the routing decision for one utterance.
#[async_trait]
pub trait IntentAnalyzer: Send + Sync {
    /// Analyze an utterance. Never fails; degraded stages are reflected in
    /// the returned intent.
    async fn analyze_intent(&self, input: &SubAgentInput) -> EnrichedIntent;
}
