//! Routing states and the messages produced in each of them.

use serde::Serialize;
use std::fmt;

use atom_core::types::{EnrichedIntent, SuggestedNextAction};

pub const CLARIFY_FALLBACK: &str = "I need more information to help you. Could you please rephrase?";

/// Goal/task wording that implies the user wants a tutorial.
const TUTORIAL_KEYWORDS: &[&str] = &["tutorial"];

/// Goal wording that implies the user wants an explanation.
const EXPLANATION_KEYWORDS: &[&str] = &["explain", "explanation"];

/// The state the orchestrator enters for an intent. Every state is
/// terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RoutingState {
    Clarifying,
    InvokingSkill { skill_id: String },
    PerformingDirectAction,
    NoActionNeeded,
    Undetermined,
}

impl RoutingState {
    /// Enter the state named by the intent's action tag. An absent or
    /// unknown skill id resolves to `fallback_skill_id`.
    pub fn for_intent(
        intent: &EnrichedIntent,
        fallback_skill_id: &str,
        is_known: impl Fn(&str) -> bool,
    ) -> Self {
        match &intent.suggested_next_action {
            SuggestedNextAction::ClarifyQuery { .. } => RoutingState::Clarifying,
            SuggestedNextAction::InvokeSkill { skill_id, .. } => {
                let skill_id = match skill_id.as_deref() {
                    Some(id) if is_known(id) => id.to_string(),
                    Some(id) => {
                        tracing::warn!(
                            skill_id = id,
                            fallback = fallback_skill_id,
                            "Unknown skill, using fallback"
                        );
                        fallback_skill_id.to_string()
                    }
                    None => fallback_skill_id.to_string(),
                };
                RoutingState::InvokingSkill { skill_id }
            }
            SuggestedNextAction::PerformDirectAction { .. } => RoutingState::PerformingDirectAction,
            SuggestedNextAction::NoActionNeeded { .. } => RoutingState::NoActionNeeded,
            SuggestedNextAction::UnableToDetermine { .. } => RoutingState::Undetermined,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoutingState::Clarifying => "clarifying",
            RoutingState::InvokingSkill { .. } => "invoking_skill",
            RoutingState::PerformingDirectAction => "performing_direct_action",
            RoutingState::NoActionNeeded => "no_action_needed",
            RoutingState::Undetermined => "undetermined",
        }
    }
}

impl fmt::Display for RoutingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingState::InvokingSkill { skill_id } => write!(f, "invoking_skill({})", skill_id),
            other => f.write_str(other.name()),
        }
    }
}

/// The clarification question, or a generic request to rephrase.
pub fn clarification_message(intent: &EnrichedIntent) -> String {
    match &intent.suggested_next_action {
        SuggestedNextAction::ClarifyQuery {
            clarification_question: Some(question),
            ..
        } if !question.trim().is_empty() => question.clone(),
        _ => CLARIFY_FALLBACK.to_string(),
    }
}

/// Guidance type implied by the synthesized goal and tasks.
pub fn guidance_hint(intent: &EnrichedIntent) -> Option<String> {
    let goal = intent.primary_goal.as_deref().unwrap_or_default().to_lowercase();
    if mentions(TUTORIAL_KEYWORDS, &goal)
        || intent
            .identified_tasks
            .iter()
            .any(|t| mentions(TUTORIAL_KEYWORDS, &t.to_lowercase()))
    {
        return Some("find_tutorial".to_string());
    }
    if mentions(EXPLANATION_KEYWORDS, &goal) {
        return Some("general_explanation".to_string());
    }
    None
}

fn mentions(keywords: &[&str], text: &str) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Apology for a failed or timed-out skill.
pub fn skill_failure_message(query: &str, error: &str) -> String {
    format!(
        "Sorry, I encountered an error while trying to get guidance for \"{}\". Error: {}",
        query, error
    )
}

/// Best-effort summary for the states that invoke nothing.
pub fn summary_message(query: &str, intent: &EnrichedIntent) -> String {
    let mut message = format!("I've analyzed your query: \"{}\".\n", query);
    message.push_str(&format!(
        "Goal: {}.\n",
        intent.primary_goal.as_deref().unwrap_or("Not clearly identified")
    ));

    let action = &intent.suggested_next_action;
    let reason = action.reason().trim();
    match action {
        SuggestedNextAction::UnableToDetermine { .. } => {
            message.push_str("I'm not sure how to proceed with this specific request yet.");
            if !reason.is_empty() {
                message.push_str(&format!(" Reason: {}", reason));
            }
        }
        _ => {
            message.push_str(&format!("Suggested next step: {}", action.action_type()));
            if !reason.is_empty() {
                message.push_str(&format!(" ({})", reason));
            }
        }
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use atom_core::types::{SubAgentReports, SynthesisResult};

    fn intent(goal: Option<&str>, tasks: &[&str], action: SuggestedNextAction) -> EnrichedIntent {
        EnrichedIntent::assemble(
            "q",
            None,
            SynthesisResult {
                primary_goal: goal.map(str::to_string),
                primary_goal_confidence: None,
                extracted_parameters: Default::default(),
                identified_tasks: tasks.iter().map(|t| t.to_string()).collect(),
                suggested_next_action: action,
                synthesis_log: vec![],
            },
            SubAgentReports::default(),
        )
    }

    fn invoke(skill_id: Option<&str>) -> SuggestedNextAction {
        SuggestedNextAction::InvokeSkill {
            skill_id: skill_id.map(str::to_string),
            reason: String::new(),
        }
    }

    #[test]
    fn test_unknown_and_absent_skill_ids_fall_back() {
        let known = |id: &str| id == "Known";

        let unknown = RoutingState::for_intent(&intent(None, &[], invoke(Some("Nope"))), "Fallback", known);
        let absent = RoutingState::for_intent(&intent(None, &[], invoke(None)), "Fallback", known);
        let direct = RoutingState::for_intent(&intent(None, &[], invoke(Some("Known"))), "Fallback", known);

        assert_eq!(unknown, RoutingState::InvokingSkill { skill_id: "Fallback".into() });
        assert_eq!(absent, RoutingState::InvokingSkill { skill_id: "Fallback".into() });
        assert_eq!(direct, RoutingState::InvokingSkill { skill_id: "Known".into() });
        assert_eq!(direct.to_string(), "invoking_skill(Known)");
    }

    #[test]
    fn test_blank_clarification_uses_fallback() {
        let blank = intent(
            None,
            &[],
            SuggestedNextAction::ClarifyQuery {
                clarification_question: Some("  ".into()),
                reason: String::new(),
            },
        );
        assert_eq!(clarification_message(&blank), CLARIFY_FALLBACK);
    }

    #[test]
    fn test_guidance_hint() {
        let reason = || invoke(None);
        assert_eq!(
            guidance_hint(&intent(Some("Find a Tutorial on mail merge"), &[], reason())).as_deref(),
            Some("find_tutorial")
        );
        assert_eq!(
            guidance_hint(&intent(Some("mail merge"), &["follow tutorial"], reason())).as_deref(),
            Some("find_tutorial")
        );
        assert_eq!(
            guidance_hint(&intent(Some("Explain conditional formatting"), &[], reason())).as_deref(),
            Some("general_explanation")
        );
        assert_eq!(guidance_hint(&intent(Some("create pivot table"), &[], reason())), None);
    }

    #[test]
    fn test_summary_for_undetermined() {
        let message = summary_message(
            "Do the thing",
            &intent(None, &[], SuggestedNextAction::unable_to_determine("LLM synthesis failed: timeout")),
        );

        assert_eq!(
            message,
            "I've analyzed your query: \"Do the thing\".\nGoal: Not clearly identified.\nI'm not sure how to proceed with this specific request yet. Reason: LLM synthesis failed: timeout"
        );
    }

    #[test]
    fn test_summary_for_no_action() {
        let message = summary_message(
            "thanks!",
            &intent(
                Some("acknowledge"),
                &[],
                SuggestedNextAction::NoActionNeeded {
                    reason: "user is saying thanks".into(),
                },
            ),
        );

        assert!(message.contains("Goal: acknowledge."));
        assert!(message.ends_with("Suggested next step: no_action_needed (user is saying thanks)"));
    }
}
