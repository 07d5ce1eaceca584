//! End-to-end: utterance -> reasoning agents -> synthesis -> orchestrator ->
//! Learning & Guidance skill.

use std::sync::Arc;

use serde_json::json;

use atom_agents::NluLeadAgent;
use atom_core::config::{NluConfig, SkillsConfig};
use atom_core::mocks::ScriptedGateway;
use atom_core::traits::LanguageModelGateway;
use atom_core::types::ActionType;
use atom_model_gateway::OfflineGateway;
use atom_orchestrator::GuidanceOrchestrator;
use atom_skills::create_default_registry;

async fn pipeline(gateway: Arc<dyn LanguageModelGateway>) -> GuidanceOrchestrator {
    let config = NluConfig::default();
    let skills = SkillsConfig::default();
    let lead = NluLeadAgent::from_config(gateway.clone(), &config);
    let registry = create_default_registry(gateway, &config.default_model, &skills)
        .await
        .unwrap();
    GuidanceOrchestrator::new(Arc::new(lead), Arc::new(registry)).with_config(&skills)
}

#[tokio::test]
async fn test_offline_pivot_question_gets_tutorial_steps() {
    let orchestrator = pipeline(Arc::new(OfflineGateway::new())).await;

    let response = orchestrator
        .process_guidance_request(
            "How do I create a pivot table in SpreadsheetApp?",
            "user-7",
            Some("SpreadsheetApp"),
        )
        .await;

    let intent = response.enriched_intent.as_ref().unwrap();
    assert_eq!(intent.action_type(), ActionType::InvokeSkill);
    assert_eq!(intent.primary_goal.as_deref(), Some("create a pivot table in SpreadsheetApp"));
    assert!(intent.raw_sub_agent_responses.analytical.is_some());
    assert!(intent.raw_sub_agent_responses.tax.is_none());

    assert!(response
        .message_to_user
        .contains("How to Create Pivot Tables in SpreadsheetApp"));
    assert!(response.message_to_user.contains("1. Select Your Data:"));

    let data = response.guidance_result.unwrap().data;
    assert_eq!(data["guidanceType"], "find_tutorial");
    assert_eq!(data["guidanceProvided"][0]["sourceArticleId"], "kb_001");
}

#[tokio::test]
async fn test_offline_vague_request_asks_for_clarification() {
    let orchestrator = pipeline(Arc::new(OfflineGateway::new())).await;

    let response = orchestrator.process_guidance_request("Help me.", "user-7", None).await;

    let intent = response.enriched_intent.unwrap();
    assert_eq!(intent.action_type(), ActionType::ClarifyQuery);
    assert!(response.message_to_user.contains("which application"));
    assert!(response.guidance_result.is_none());
}

#[tokio::test]
async fn test_unknown_skill_routes_to_guidance_with_explanation() {
    let gateway = Arc::new(
        ScriptedGateway::new()
            .with_content(
                "custom_lead_agent_synthesis",
                json!({
                    "primaryGoal": "explain conditional formatting",
                    "primaryGoalConfidence": 0.8,
                    "identifiedTasks": [],
                    "extractedParameters": {},
                    "suggestedNextAction": {
                        "actionType": "invoke_skill",
                        "skillId": "FormattingWizard",
                        "reason": "explanation request"
                    }
                })
                .to_string(),
            )
            .with_content("summarize_for_explanation", "Conditional formatting colors cells that match rules."),
    );
    let orchestrator = pipeline(gateway.clone()).await;

    let response = orchestrator
        .process_guidance_request("What does conditional formatting do?", "user-7", None)
        .await;

    assert!(response.message_to_user.contains("Understanding Conditional Formatting"));
    assert!(response
        .message_to_user
        .contains("Conditional formatting colors cells that match rules."));
    // The hint from the goal skips classification.
    assert!(gateway.calls_for("classify_guidance_query").is_empty());

    let intent = response.enriched_intent.unwrap();
    assert!(intent
        .synthesis_log
        .iter()
        .any(|line| line.starts_with("AnalyticalAgent degraded:")));
}

#[tokio::test]
async fn test_gateway_outage_degrades_to_summary() {
    let orchestrator = pipeline(Arc::new(ScriptedGateway::new())).await;

    let response = orchestrator.process_guidance_request("Do the thing", "user-7", None).await;

    assert!(response
        .message_to_user
        .contains("I'm not sure how to proceed with this specific request yet. Reason: LLM synthesis failed:"));
    let intent = response.enriched_intent.unwrap();
    assert_eq!(intent.action_type(), ActionType::UnableToDetermine);
    assert!(intent.raw_sub_agent_responses.practical.is_some());
}
