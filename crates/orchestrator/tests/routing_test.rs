//! Every decision the synthesizer can make ends in a terminal state with a
//! message for the user.

use std::sync::Arc;

use serde_json::json;

use atom_core::mocks::{RecordingSkill, StaticIntentAnalyzer};
use atom_core::traits::SkillRegistry;
use atom_core::types::{EnrichedIntent, SubAgentReports, SuggestedNextAction, SynthesisResult};
use atom_orchestrator::{GuidanceOrchestrator, CLARIFY_FALLBACK};
use atom_skills::DefaultSkillRegistry;

fn intent(goal: Option<&str>, action: SuggestedNextAction) -> EnrichedIntent {
    EnrichedIntent::assemble(
        "placeholder",
        None,
        SynthesisResult {
            primary_goal: goal.map(str::to_string),
            primary_goal_confidence: Some(0.7),
            extracted_parameters: Default::default(),
            identified_tasks: vec![],
            suggested_next_action: action,
            synthesis_log: vec![],
        },
        SubAgentReports::default(),
    )
}

async fn orchestrator_with(
    intent: EnrichedIntent,
    skills: Vec<Arc<RecordingSkill>>,
) -> (GuidanceOrchestrator, Arc<StaticIntentAnalyzer>) {
    let registry = DefaultSkillRegistry::new();
    for skill in skills {
        registry.register(skill).await.unwrap();
    }
    let analyzer = Arc::new(StaticIntentAnalyzer::new(intent));
    let orchestrator = GuidanceOrchestrator::new(analyzer.clone(), Arc::new(registry));
    (orchestrator, analyzer)
}

#[tokio::test]
async fn test_clarify_query_returns_question() {
    let (orchestrator, analyzer) = orchestrator_with(
        intent(
            Some("get help"),
            SuggestedNextAction::ClarifyQuery {
                clarification_question: Some("Which application are you using?".into()),
                reason: "vague".into(),
            },
        ),
        vec![],
    )
    .await;

    let response = orchestrator.process_guidance_request("Help me.", "u1", None).await;

    assert_eq!(response.message_to_user, "Which application are you using?");
    assert!(response.guidance_result.is_none());
    let intent = response.enriched_intent.unwrap();
    assert_eq!(intent.original_query, "Help me.");
    assert_eq!(intent.user_id.as_deref(), Some("u1"));
    assert_eq!(analyzer.inputs()[0].user_input, "Help me.");
}

#[tokio::test]
async fn test_clarify_without_question_uses_fallback() {
    let (orchestrator, _) = orchestrator_with(
        intent(
            None,
            SuggestedNextAction::ClarifyQuery {
                clarification_question: None,
                reason: String::new(),
            },
        ),
        vec![],
    )
    .await;

    let response = orchestrator.process_guidance_request("hmm", "u1", None).await;

    assert_eq!(response.message_to_user, CLARIFY_FALLBACK);
}

#[tokio::test]
async fn test_invoke_skill_runs_named_skill() {
    let guidance = Arc::new(RecordingSkill::replying("LearningAndGuidanceSkill", "guidance"));
    let wizard = Arc::new(RecordingSkill::replying("ChartWizard", "Here is your chart."));
    let (orchestrator, _) = orchestrator_with(
        intent(
            Some("create a chart"),
            SuggestedNextAction::InvokeSkill {
                skill_id: Some("ChartWizard".into()),
                reason: "chart request".into(),
            },
        ),
        vec![guidance.clone(), wizard.clone()],
    )
    .await;

    let response = orchestrator
        .process_guidance_request("make me a chart", "u2", Some("SpreadsheetApp"))
        .await;

    assert_eq!(response.message_to_user, "Here is your chart.");
    assert_eq!(wizard.calls().len(), 1);
    assert_eq!(wizard.calls()[0].query, "create a chart");
    assert!(guidance.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_skill_falls_back_to_guidance() {
    let guidance = Arc::new(RecordingSkill::replying("LearningAndGuidanceSkill", "guidance"));
    let (orchestrator, _) = orchestrator_with(
        intent(
            None,
            SuggestedNextAction::InvokeSkill {
                skill_id: Some("NoSuchSkill".into()),
                reason: String::new(),
            },
        ),
        vec![guidance.clone()],
    )
    .await;

    let response = orchestrator.process_guidance_request("pivot tables", "u1", None).await;

    assert_eq!(response.message_to_user, "guidance");
    // No goal, so the raw utterance is forwarded.
    assert_eq!(guidance.calls()[0].query, "pivot tables");
}

#[tokio::test]
async fn test_skill_error_becomes_apology() {
    let failing = Arc::new(RecordingSkill::failing("LearningAndGuidanceSkill", "knowledge base offline"));
    let (orchestrator, _) = orchestrator_with(
        intent(
            Some("find pivot docs"),
            SuggestedNextAction::InvokeSkill {
                skill_id: None,
                reason: String::new(),
            },
        ),
        vec![failing],
    )
    .await;

    let response = orchestrator.process_guidance_request("pivot", "u1", None).await;

    assert_eq!(
        response.message_to_user,
        "Sorry, I encountered an error while trying to get guidance for \"pivot\". Error: Skill execution failed: knowledge base offline"
    );
    assert!(response.guidance_result.is_none());
}

#[tokio::test]
async fn test_perform_direct_action_summarizes() {
    let (orchestrator, _) = orchestrator_with(
        intent(
            Some("open settings"),
            SuggestedNextAction::PerformDirectAction {
                direct_action_details: Some(json!({"target": "settings"})),
                reason: "simple navigation".into(),
            },
        ),
        vec![],
    )
    .await;

    let response = orchestrator.process_guidance_request("open settings", "u1", None).await;

    assert_eq!(
        response.message_to_user,
        "I've analyzed your query: \"open settings\".\nGoal: open settings.\nSuggested next step: perform_direct_action (simple navigation)"
    );
}

#[tokio::test]
async fn test_no_action_needed_summarizes() {
    let (orchestrator, _) = orchestrator_with(
        intent(
            None,
            SuggestedNextAction::NoActionNeeded {
                reason: "greeting".into(),
            },
        ),
        vec![],
    )
    .await;

    let response = orchestrator.process_guidance_request("hello", "u1", None).await;

    assert!(response.message_to_user.contains("Goal: Not clearly identified."));
    assert!(response.message_to_user.ends_with("no_action_needed (greeting)"));
}

#[tokio::test]
async fn test_unable_to_determine_reports_reason() {
    let (orchestrator, _) = orchestrator_with(
        intent(None, SuggestedNextAction::unable_to_determine("LLM synthesis failed: timeout")),
        vec![],
    )
    .await;

    let response = orchestrator.process_guidance_request("Do the thing", "u1", None).await;

    assert!(response
        .message_to_user
        .ends_with("I'm not sure how to proceed with this specific request yet. Reason: LLM synthesis failed: timeout"));
    assert_eq!(
        response.enriched_intent.unwrap().suggested_next_action.action_type().as_str(),
        "unable_to_determine"
    );
}
