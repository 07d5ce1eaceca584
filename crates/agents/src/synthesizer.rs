//! Reconciles every lens into one routing decision.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use atom_core::decode::{decode_object, field, text_field, Fields};
use atom_core::template::render_prompt;
use atom_core::traits::LanguageModelGateway;
use atom_core::types::{
    clamp_confidence, ActionType, GatewayRequest, SubAgentInput, SubAgentReports,
    SuggestedNextAction, SynthesisResult,
};
use atom_governance::track_agent_run;
use serde_json::{Map, Value};

use crate::invoke::{invoke_gateway, AgentSettings};

pub const SYNTHESIS_TASK: &str = "custom_lead_agent_synthesis";

const AGENT_NAME: &str = "SynthesizingAgent";

const TEMPLATE: &str = r#"You are the Synthesizing Agent of an NLU system. Several specialist agents analyzed the same user query. Reconcile their analyses into ONE actionable decision.

User's query: "{{ user_input }}"
UserId: {{ user_id }}

Sub-agent analyses (null means the agent was not run for this request):
{{ reports }}

Decision rules:
- If the Analytical agent found consistent, explicit tasks and the Practical feasibility is High or Medium, prefer "invoke_skill".
- If the Creative agent flags significant ambiguity, or Practical feasibility is Low, or the query is too vague to act on, prefer "clarify_query" and ask one specific question.
- If the request can be fulfilled with a direct system action rather than a skill, use "perform_direct_action".
- If the user is only chatting or acknowledging, use "no_action_needed".
- If the analyses conflict and none of the above applies, use "unable_to_determine".
- Only include the fields that belong to the chosen actionType.

Return ONLY a valid JSON object with this structure:
{
  "primaryGoal": "string",
  "primaryGoalConfidence": 0.0,
  "extractedParameters": { "key": "value" },
  "identifiedTasks": ["string"],
  "suggestedNextAction": {
    "actionType": "invoke_skill | clarify_query | perform_direct_action | no_action_needed | unable_to_determine",
    "skillId": "only for invoke_skill",
    "clarificationQuestion": "only for clarify_query",
    "directActionDetails": "only for perform_direct_action",
    "reason": "string"
  }
}
"#;

/// Produces the routing decision from the collected sub-agent records.
pub struct SynthesizingAgent {
    gateway: Arc<dyn LanguageModelGateway>,
    settings: AgentSettings,
}

impl SynthesizingAgent {
    pub fn new(gateway: Arc<dyn LanguageModelGateway>, settings: AgentSettings) -> Self {
        Self { gateway, settings }
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// The rendered instruction, with every lens serialized verbatim.
    pub fn prompt(&self, input: &SubAgentInput, reports: &SubAgentReports) -> atom_core::Result<String> {
        let reports = serde_json::to_string_pretty(reports)?;
        render_prompt(
            TEMPLATE,
            &[
                ("user_input", input.user_input.as_str()),
                ("user_id", input.user_id_or_na()),
                ("reports", reports.as_str()),
            ],
        )
    }

    /// Synthesize a decision. Failure of any kind yields
    /// `unable_to_determine` with a diagnostic reason.
    pub async fn synthesize(
        &self,
        input: &SubAgentInput,
        reports: &SubAgentReports,
        cancel: &CancellationToken,
    ) -> SynthesisResult {
        let prompt = match self.prompt(input, reports) {
            Ok(prompt) => prompt,
            Err(e) => return fail(format!("Prompt template error: {}", e)),
        };

        let request = GatewayRequest::prompted(SYNTHESIS_TASK, prompt, input.user_input.as_str());
        let response = invoke_gateway(self.gateway.as_ref(), &request, &self.settings, cancel).await;

        let Some(content) = response.usable_content() else {
            return fail(format!("LLM synthesis failed: {}", response.failure_reason()));
        };

        match decode_object(content) {
            Ok(fields) => {
                track_agent_run(AGENT_NAME, "ok");
                interpret(&fields)
            }
            Err(e) => fail(format!("Failed to parse synthesis JSON response: {}", e)),
        }
    }
}

fn fail(reason: String) -> SynthesisResult {
    tracing::warn!(agent = AGENT_NAME, reason = %reason, "Synthesis degraded");
    track_agent_run(AGENT_NAME, "degraded");
    SynthesisResult::unable_to_determine(reason)
}

/// Turn decoded synthesis output into a result, re-validating the action
/// tag and keeping only the fields that belong to it.
fn interpret(fields: &Fields) -> SynthesisResult {
    let mut log = field::<Vec<String>>(fields, "synthesisLog").unwrap_or_default();
    let action = match fields.get("suggestedNextAction") {
        Some(Value::Object(action)) => next_action(action, &mut log),
        _ => {
            log.push("suggestedNextAction missing from synthesis output.".to_string());
            SuggestedNextAction::unable_to_determine("Synthesis did not suggest a next action.")
        }
    };

    let raw_confidence = field::<f64>(fields, "primaryGoalConfidence");
    let primary_goal_confidence = raw_confidence.and_then(clamp_confidence);
    if let (Some(raw), Some(clamped)) = (raw_confidence, primary_goal_confidence) {
        if raw != clamped {
            log.push(format!("primaryGoalConfidence {} clamped to {}.", raw, clamped));
        }
    }

    SynthesisResult {
        primary_goal: text_field(fields, "primaryGoal"),
        primary_goal_confidence,
        extracted_parameters: field::<Map<String, Value>>(fields, "extractedParameters").unwrap_or_default(),
        identified_tasks: field(fields, "identifiedTasks").unwrap_or_default(),
        suggested_next_action: action,
        synthesis_log: log,
    }
}

fn next_action(action: &Fields, log: &mut Vec<String>) -> SuggestedNextAction {
    let reason = text_field(action, "reason").unwrap_or_default();
    let tag = text_field(action, "actionType");

    let Some(action_type) = tag.as_deref().and_then(ActionType::from_tag) else {
        let claimed = tag.unwrap_or_else(|| "<missing>".to_string());
        log.push(format!("Unknown actionType '{}' coerced to unable_to_determine.", claimed));
        return SuggestedNextAction::unable_to_determine(if reason.is_empty() {
            format!("Synthesis returned unknown action type '{}'.", claimed)
        } else {
            reason
        });
    };

    match action_type {
        ActionType::InvokeSkill => SuggestedNextAction::InvokeSkill {
            skill_id: text_field(action, "skillId"),
            reason,
        },
        ActionType::ClarifyQuery => SuggestedNextAction::ClarifyQuery {
            clarification_question: text_field(action, "clarificationQuestion"),
            reason,
        },
        ActionType::PerformDirectAction => SuggestedNextAction::PerformDirectAction {
            direct_action_details: action
                .get("directActionDetails")
                .filter(|v| !v.is_null())
                .cloned(),
            reason,
        },
        ActionType::NoActionNeeded => SuggestedNextAction::NoActionNeeded { reason },
        ActionType::UnableToDetermine => SuggestedNextAction::UnableToDetermine { reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atom_core::mocks::ScriptedGateway;
    use serde_json::json;

    fn agent(gateway: Arc<ScriptedGateway>) -> SynthesizingAgent {
        SynthesizingAgent::new(gateway, AgentSettings::new("m", 0.3))
    }

    async fn synthesize(content: &str) -> SynthesisResult {
        let gateway = Arc::new(ScriptedGateway::new().with_content(SYNTHESIS_TASK, content));
        agent(gateway)
            .synthesize(
                &SubAgentInput::new("How do I create a pivot table?"),
                &SubAgentReports::default(),
                &CancellationToken::new(),
            )
            .await
    }

    #[tokio::test]
    async fn test_timeout_is_exact_failure_state() {
        let gateway = Arc::new(ScriptedGateway::new().with_failure(SYNTHESIS_TASK, "timeout"));

        let result = agent(gateway)
            .synthesize(&SubAgentInput::new("x"), &SubAgentReports::default(), &CancellationToken::new())
            .await;

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "suggestedNextAction": {
                    "actionType": "unable_to_determine",
                    "reason": "LLM synthesis failed: timeout"
                }
            })
        );
    }

    #[tokio::test]
    async fn test_invoke_skill_drops_foreign_fields() {
        let result = synthesize(
            r#"{"primaryGoal":"create a pivot table","primaryGoalConfidence":0.9,
                "suggestedNextAction":{"actionType":"invoke_skill","skillId":"LearningAndGuidanceSkill",
                "clarificationQuestion":"should not survive","reason":"clear how-to"}}"#,
        )
        .await;

        assert_eq!(
            result.suggested_next_action,
            SuggestedNextAction::InvokeSkill {
                skill_id: Some("LearningAndGuidanceSkill".into()),
                reason: "clear how-to".into(),
            }
        );
        let value = serde_json::to_value(&result.suggested_next_action).unwrap();
        assert!(value.get("clarificationQuestion").is_none());
    }

    #[tokio::test]
    async fn test_unknown_tag_is_coerced() {
        let result = synthesize(r#"{"suggestedNextAction":{"actionType":"launch_rocket"}}"#).await;

        assert_eq!(result.suggested_next_action.action_type(), ActionType::UnableToDetermine);
        assert!(result.synthesis_log[0].contains("launch_rocket"));
    }

    #[tokio::test]
    async fn test_missing_action_is_coerced() {
        let result = synthesize(r#"{"primaryGoal":"something"}"#).await;

        assert_eq!(result.suggested_next_action.action_type(), ActionType::UnableToDetermine);
        assert_eq!(result.primary_goal.as_deref(), Some("something"));
    }

    #[tokio::test]
    async fn test_confidence_is_clamped() {
        let high = synthesize(r#"{"primaryGoalConfidence":1.7,"suggestedNextAction":{"actionType":"no_action_needed","reason":"chat"}}"#).await;
        let low = synthesize(r#"{"primaryGoalConfidence":-3,"suggestedNextAction":{"actionType":"no_action_needed","reason":"chat"}}"#).await;

        assert_eq!(high.primary_goal_confidence, Some(1.0));
        assert_eq!(low.primary_goal_confidence, Some(0.0));
        assert!(high.synthesis_log.iter().any(|l| l.contains("clamped")));
    }

    #[tokio::test]
    async fn test_unparsable_content_fails() {
        let result = synthesize("The user probably wants a pivot table.").await;

        assert_eq!(result.suggested_next_action.action_type(), ActionType::UnableToDetermine);
        assert!(result
            .suggested_next_action
            .reason()
            .starts_with("Failed to parse synthesis JSON response"));
    }

    #[tokio::test]
    async fn test_prompt_serializes_absent_lenses_as_null() {
        let gateway = Arc::new(ScriptedGateway::new());
        let prompt = agent(gateway)
            .prompt(&SubAgentInput::new("Help me."), &SubAgentReports::default())
            .unwrap();

        assert!(prompt.contains("\"analytical\": null"));
        assert!(prompt.contains("\"socialMedia\": null"));
        assert!(prompt.contains("User's query: \"Help me.\""));
    }

    #[tokio::test]
    async fn test_direct_action_keeps_details() {
        let result = synthesize(
            r#"{"suggestedNextAction":{"actionType":"perform_direct_action","directActionDetails":{"command":"open_settings"},"reason":"direct"}}"#,
        )
        .await;

        assert_eq!(
            result.suggested_next_action,
            SuggestedNextAction::PerformDirectAction {
                direct_action_details: Some(json!({"command": "open_settings"})),
                reason: "direct".into(),
            }
        );
    }
}
