//! Guidance orchestrator: routes an enriched intent to clarification, a
//! skill, or a summary.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use atom_core::config::SkillsConfig;
use atom_core::traits::{IntentAnalyzer, SkillRegistry};
use atom_core::types::{EnrichedIntent, SkillInput, SkillOutput, SubAgentInput, SuggestedNextAction};
use atom_core::{Error, Result};
use atom_governance::track_route;

use crate::routing::{clarification_message, guidance_hint, skill_failure_message, summary_message, RoutingState};

/// What the orchestrator hands back for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorResponse {
    pub message_to_user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance_result: Option<SkillOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enriched_intent: Option<EnrichedIntent>,
}

/// Routes analyzed utterances to skills.
pub struct GuidanceOrchestrator {
    analyzer: Arc<dyn IntentAnalyzer>,
    registry: Arc<dyn SkillRegistry>,
    fallback_skill_id: String,
    skill_timeout: Duration,
}

impl GuidanceOrchestrator {
    pub fn new(analyzer: Arc<dyn IntentAnalyzer>, registry: Arc<dyn SkillRegistry>) -> Self {
        let defaults = SkillsConfig::default();
        Self {
            analyzer,
            registry,
            fallback_skill_id: defaults.fallback_skill_id,
            skill_timeout: Duration::from_millis(defaults.skill_timeout_ms),
        }
    }

    pub fn with_config(mut self, config: &SkillsConfig) -> Self {
        self.fallback_skill_id = config.fallback_skill_id.clone();
        self.skill_timeout = Duration::from_millis(config.skill_timeout_ms);
        self
    }

    pub fn with_fallback_skill(mut self, skill_id: impl Into<String>) -> Self {
        self.fallback_skill_id = skill_id.into();
        self
    }

    pub fn with_skill_timeout(mut self, timeout: Duration) -> Self {
        self.skill_timeout = timeout;
        self
    }

    /// Analyze `query` and act on the resulting decision.
    pub async fn process_guidance_request(
        &self,
        query: &str,
        user_id: &str,
        application_context: Option<&str>,
    ) -> OrchestratorResponse {
        tracing::info!(
            user_id,
            application_context = application_context.unwrap_or("General"),
            "Received guidance request"
        );

        let input = SubAgentInput::new(query).with_user_id(user_id);
        let intent = self.analyzer.analyze_intent(&input).await;
        self.route(intent, query, user_id, application_context).await
    }

    /// Act on an already analyzed intent.
    pub async fn route(
        &self,
        intent: EnrichedIntent,
        query: &str,
        user_id: &str,
        application_context: Option<&str>,
    ) -> OrchestratorResponse {
        let state = self.enter(&intent).await;
        track_route(intent.action_type().as_str());
        tracing::info!(
            request_id = %intent.request_id,
            action_type = intent.action_type().as_str(),
            state = %state,
            "Routing intent"
        );

        match state {
            RoutingState::Clarifying => OrchestratorResponse {
                message_to_user: clarification_message(&intent),
                guidance_result: None,
                enriched_intent: Some(intent),
            },
            RoutingState::InvokingSkill { skill_id } => {
                let skill_query = intent.primary_goal.clone().unwrap_or_else(|| query.to_string());
                let skill_input = SkillInput::new(user_id, skill_query)
                    .with_application_context(application_context.map(str::to_string))
                    .with_guidance_type_hint(guidance_hint(&intent))
                    .with_parameters(intent.extracted_parameters.clone());

                match self.invoke_skill(&skill_id, skill_input).await {
                    Ok(output) => OrchestratorResponse {
                        message_to_user: output.message.clone(),
                        guidance_result: Some(output),
                        enriched_intent: Some(intent),
                    },
                    Err(error) => {
                        tracing::error!(skill_id = %skill_id, error = %error, "Skill failed");
                        OrchestratorResponse {
                            message_to_user: skill_failure_message(query, &error.to_string()),
                            guidance_result: None,
                            enriched_intent: Some(intent),
                        }
                    }
                }
            }
            RoutingState::PerformingDirectAction | RoutingState::NoActionNeeded | RoutingState::Undetermined => {
                OrchestratorResponse {
                    message_to_user: summary_message(query, &intent),
                    guidance_result: None,
                    enriched_intent: Some(intent),
                }
            }
        }
    }

    async fn enter(&self, intent: &EnrichedIntent) -> RoutingState {
        let known = match &intent.suggested_next_action {
            SuggestedNextAction::InvokeSkill {
                skill_id: Some(id), ..
            } => self.registry.get(id).await.is_some(),
            _ => false,
        };
        RoutingState::for_intent(intent, &self.fallback_skill_id, |_| known)
    }

    /// Run a skill under the configured timeout.
    async fn invoke_skill(&self, skill_id: &str, input: SkillInput) -> Result<SkillOutput> {
        tracing::debug!(skill_id, query = %input.query, hint = ?input.guidance_type_hint, "Invoking skill");

        tokio::time::timeout(self.skill_timeout, self.registry.execute(skill_id, input))
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "skill '{}' did not finish within {}ms",
                    skill_id,
                    self.skill_timeout.as_millis()
                ))
            })?
    }
}
