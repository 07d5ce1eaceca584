//! NLU coordinator: fan-out to the reasoning agents, fan-in to synthesis.

use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use atom_core::config::{NluConfig, PartialFailurePolicy};
use atom_core::traits::{IntentAnalyzer, LanguageModelGateway};
use atom_core::types::{AgentKind, EnrichedIntent, SubAgentInput, SubAgentReports, SynthesisResult};
use atom_core::{Error, Result};

use crate::analytical::AnalyticalAgent;
use crate::creative::CreativeAgent;
use crate::invoke::AgentSettings;
use crate::lens::ReasoningAgent;
use crate::practical::PracticalAgent;
use crate::specialists::{ContentCreationAgent, SocialMediaAgent, TaxAgent};
use crate::synthesizer::SynthesizingAgent;

/// Drives one utterance through every configured lens and the synthesizer.
pub struct NluLeadAgent {
    agents: Vec<Arc<dyn ReasoningAgent>>,
    synthesizer: SynthesizingAgent,
    policy: PartialFailurePolicy,
}

impl NluLeadAgent {
    pub fn builder() -> NluLeadAgentBuilder {
        NluLeadAgentBuilder::new()
    }

    /// The three core lenses plus the configured specialists, all sharing
    /// `gateway`.
    pub fn from_config(gateway: Arc<dyn LanguageModelGateway>, config: &NluConfig) -> Self {
        let temps = config.temperatures;
        let settings = |t: f32| AgentSettings::from_config(config, t);

        let mut builder = Self::builder()
            .with_agent(Arc::new(AnalyticalAgent::new(gateway.clone(), settings(temps.analytical))))
            .with_agent(Arc::new(
                CreativeAgent::new(gateway.clone(), settings(temps.creative)).with_sample_fixtures(),
            ))
            .with_agent(Arc::new(PracticalAgent::new(gateway.clone(), settings(temps.practical))))
            .with_policy(config.partial_failure);

        for name in &config.specialists {
            let specialist: Arc<dyn ReasoningAgent> = match AgentKind::from_config_name(name) {
                Some(AgentKind::Tax) => Arc::new(TaxAgent::new(gateway.clone(), settings(temps.specialist))),
                Some(AgentKind::SocialMedia) => {
                    Arc::new(SocialMediaAgent::new(gateway.clone(), settings(temps.specialist)))
                }
                Some(AgentKind::ContentCreation) => {
                    Arc::new(ContentCreationAgent::new(gateway.clone(), settings(temps.specialist)))
                }
                Some(core) => {
                    tracing::debug!(agent = core.name(), "Core lens listed as specialist, ignored");
                    continue;
                }
                None => {
                    tracing::warn!(specialist = %name, "Unknown specialist in config, skipped");
                    continue;
                }
            };
            builder = builder.with_agent(specialist);
        }

        NluLeadAgent {
            agents: builder.agents,
            synthesizer: SynthesizingAgent::new(gateway, settings(temps.synthesis)),
            policy: builder.policy,
        }
    }

    /// Lenses run for every request, in registration order.
    pub fn kinds(&self) -> Vec<AgentKind> {
        self.agents.iter().map(|a| a.kind()).collect()
    }

    pub fn policy(&self) -> PartialFailurePolicy {
        self.policy
    }

    /// Analyze `input`, abandoning outstanding Gateway calls once `cancel`
    /// fires. Cancelled stages degrade like any other failure.
    pub async fn analyze_intent_with_cancel(
        &self,
        input: &SubAgentInput,
        cancel: CancellationToken,
    ) -> EnrichedIntent {
        let started = Instant::now();
        tracing::info!(
            user_id = input.user_id_or_na(),
            agents = self.agents.len(),
            "Analyzing intent"
        );

        let reports = self.fan_out(input, &cancel).await;

        let mut log: Vec<String> = reports
            .degraded()
            .into_iter()
            .map(|(kind, reason)| format!("{} degraded: {}", kind.name(), reason))
            .collect();

        let mut synthesis = match self.quorum_shortfall(&reports) {
            Some(reason) => {
                tracing::warn!(reason = %reason, "Skipping synthesis");
                SynthesisResult::unable_to_determine(reason)
            }
            None => self.synthesizer.synthesize(input, &reports, &cancel).await,
        };

        log.append(&mut synthesis.synthesis_log);
        synthesis.synthesis_log = log;

        let intent = EnrichedIntent::assemble(
            input.user_input.clone(),
            input.user_id.clone(),
            synthesis,
            reports,
        );

        tracing::info!(
            request_id = %intent.request_id,
            action_type = intent.action_type().as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Intent analyzed"
        );
        intent
    }

    /// Run every agent concurrently and wait for all of them. A panicking
    /// agent leaves its slot `None`.
    async fn fan_out(&self, input: &SubAgentInput, cancel: &CancellationToken) -> SubAgentReports {
        let runs = self.agents.iter().map(|agent| {
            let kind = agent.kind();
            async move {
                let outcome = AssertUnwindSafe(agent.analyze_with_cancel(input, cancel))
                    .catch_unwind()
                    .await;
                (kind, outcome)
            }
        });

        let mut reports = SubAgentReports::default();
        for (kind, outcome) in join_all(runs).await {
            match outcome {
                Ok(response) => reports.insert(response),
                Err(_) => {
                    tracing::error!(agent = kind.name(), "Agent panicked, recorded as null");
                }
            }
        }
        reports
    }

    fn quorum_shortfall(&self, reports: &SubAgentReports) -> Option<String> {
        match self.policy {
            PartialFailurePolicy::Proceed => None,
            PartialFailurePolicy::RequireQuorum { min_healthy } => {
                let healthy = reports.healthy_count();
                (healthy < min_healthy).then(|| {
                    format!(
                        "Only {} of the required {} reasoning agents produced an analysis; synthesis skipped.",
                        healthy, min_healthy
                    )
                })
            }
        }
    }
}

#[async_trait]
impl IntentAnalyzer for NluLeadAgent {
    async fn analyze_intent(&self, input: &SubAgentInput) -> EnrichedIntent {
        self.analyze_intent_with_cancel(input, CancellationToken::new())
            .await
    }
}

/// Builder for constructing an [`NluLeadAgent`].
pub struct NluLeadAgentBuilder {
    agents: Vec<Arc<dyn ReasoningAgent>>,
    synthesizer: Option<SynthesizingAgent>,
    policy: PartialFailurePolicy,
}

impl NluLeadAgentBuilder {
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            synthesizer: None,
            policy: PartialFailurePolicy::default(),
        }
    }

    /// Add a reasoning agent. A second agent for the same lens replaces the
    /// first.
    pub fn with_agent(mut self, agent: Arc<dyn ReasoningAgent>) -> Self {
        self.agents.retain(|a| a.kind() != agent.kind());
        self.agents.push(agent);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: SynthesizingAgent) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn with_policy(mut self, policy: PartialFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Result<NluLeadAgent> {
        let synthesizer = self
            .synthesizer
            .ok_or_else(|| Error::agent("NluLeadAgent requires a synthesizing agent"))?;

        Ok(NluLeadAgent {
            agents: self.agents,
            synthesizer,
            policy: self.policy,
        })
    }
}

impl Default for NluLeadAgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
