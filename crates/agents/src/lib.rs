//! Reasoning agents, synthesis and the NLU coordinator.
//!
//! Every agent is constructed with an explicit Gateway handle. Agents never
//! return errors: Gateway failures, timeouts, cancellation and unparsable
//! content all degrade to fully-populated default records.

pub mod analytical;
pub mod creative;
pub mod fixtures;
pub mod invoke;
pub mod lead;
pub mod lens;
pub mod practical;
pub mod specialists;
pub mod synthesizer;

pub use analytical::{AnalyticalAgent, AnalyticalLens};
pub use creative::{CreativeAgent, CreativeLens};
pub use fixtures::{fingerprint, CannedResponseTable, ResponseFixtures};
pub use invoke::{invoke_gateway, AgentSettings};
pub use lead::{NluLeadAgent, NluLeadAgentBuilder};
pub use lens::{Degradation, Lens, LensAgent, ReasoningAgent, NOT_SPECIFIED};
pub use practical::{PracticalAgent, PracticalLens};
pub use specialists::{
    ContentCreationAgent, ContentCreationLens, SocialMediaAgent, SocialMediaLens, TaxAgent, TaxLens,
};
pub use synthesizer::{SynthesizingAgent, SYNTHESIS_TASK};
pub use tokio_util::sync::CancellationToken;
