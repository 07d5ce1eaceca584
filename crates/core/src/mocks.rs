//! Test doubles for the core traits.
//!
//! These are shared by the unit and integration tests of every crate in the
//! workspace, so they live in the library rather than behind `cfg(test)`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::{
    traits::{IntentAnalyzer, LanguageModelGateway, Skill},
    types::{
        EnrichedIntent, GatewayRequest, GatewayResponse, GenerationOptions, SkillInput,
        SkillOutput, SubAgentInput,
    },
    Error, Result,
};

// =============================================================================
// Gateways
// =============================================================================

/// One Gateway invocation as seen by a test double.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub task: String,
    pub model: String,
    pub options: GenerationOptions,
    pub request: GatewayRequest,
}

/// Gateway that answers each task with a scripted response.
///
/// Tasks without a script get a failure response.
#[derive(Default)]
pub struct ScriptedGateway {
    scripts: Mutex<HashMap<String, GatewayResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `task` with successful content.
    pub fn with_content(self, task: &str, content: impl Into<String>) -> Self {
        self.with_response(task, GatewayResponse::ok(content))
    }

    /// Answer `task` with a failure.
    pub fn with_failure(self, task: &str, error: impl Into<String>) -> Self {
        self.with_response(task, GatewayResponse::failure(error))
    }

    /// Answer `task` with an arbitrary response.
    pub fn with_response(self, task: &str, response: GatewayResponse) -> Self {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(task.to_string(), response);
        self
    }

    /// Every call made so far, in arrival order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Calls made for one task.
    pub fn calls_for(&self, task: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.task == task)
            .collect()
    }
}

#[async_trait]
impl LanguageModelGateway for ScriptedGateway {
    async fn generate(
        &self,
        request: &GatewayRequest,
        model: &str,
        options: GenerationOptions,
    ) -> GatewayResponse {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                task: request.task.clone(),
                model: model.to_string(),
                options,
                request: request.clone(),
            });

        let scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        scripts.get(&request.task).cloned().unwrap_or_else(|| {
            GatewayResponse::failure(format!("No script for task {}", request.task))
        })
    }
}

/// Gateway that fails every call with the same error.
pub struct FailingGateway {
    error: String,
}

impl FailingGateway {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[async_trait]
impl LanguageModelGateway for FailingGateway {
    async fn generate(
        &self,
        _request: &GatewayRequest,
        _model: &str,
        _options: GenerationOptions,
    ) -> GatewayResponse {
        GatewayResponse::failure(self.error.clone())
    }
}

// =============================================================================
// Skills
// =============================================================================

/// Skill that records its inputs and replies with a fixed outcome.
pub struct RecordingSkill {
    id: String,
    description: String,
    outcome: std::result::Result<SkillOutput, String>,
    calls: Mutex<Vec<SkillInput>>,
}

impl RecordingSkill {
    /// A skill that always succeeds with `message`.
    pub fn replying(id: &str, message: &str) -> Self {
        Self {
            id: id.to_string(),
            description: format!("Recording skill {}", id),
            outcome: Ok(SkillOutput::text(message)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A skill that always rejects with `error`.
    pub fn failing(id: &str, error: &str) -> Self {
        Self {
            outcome: Err(error.to_string()),
            ..Self::replying(id, "")
        }
    }

    pub fn calls(&self) -> Vec<SkillInput> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Skill for RecordingSkill {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&self, input: SkillInput) -> Result<SkillOutput> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(input);
        self.outcome.clone().map_err(Error::skill)
    }
}

// =============================================================================
// Intent Analyzer
// =============================================================================

/// Analyzer that returns a fixed intent, re-stamped with the caller's query.
pub struct StaticIntentAnalyzer {
    intent: EnrichedIntent,
    inputs: Mutex<Vec<SubAgentInput>>,
}

impl StaticIntentAnalyzer {
    pub fn new(intent: EnrichedIntent) -> Self {
        Self {
            intent,
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn inputs(&self) -> Vec<SubAgentInput> {
        self.inputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl IntentAnalyzer for StaticIntentAnalyzer {
    async fn analyze_intent(&self, input: &SubAgentInput) -> EnrichedIntent {
        self.inputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(input.clone());

        let mut intent = self.intent.clone();
        intent.original_query = input.user_input.clone();
        intent.user_id = input.user_id.clone();
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SubAgentReports, SynthesisResult};

    #[tokio::test]
    async fn test_scripted_gateway_records_and_defaults() {
        let gateway = ScriptedGateway::new().with_content("a", "{}");
        let options = GenerationOptions::json(0.2);

        let hit = gateway
            .generate(&GatewayRequest::prompted("a", "s", "q"), "m", options)
            .await;
        let miss = gateway
            .generate(&GatewayRequest::prompted("b", "s", "q"), "m", options)
            .await;

        assert_eq!(hit.usable_content(), Some("{}"));
        assert!(!miss.success);
        assert_eq!(gateway.calls().len(), 2);
        assert_eq!(gateway.calls_for("a")[0].options.temperature, Some(0.2));
    }

    #[tokio::test]
    async fn test_recording_skill_failure() {
        let skill = RecordingSkill::failing("S", "boom");
        let err = skill.execute(SkillInput::new("u", "q")).await.unwrap_err();

        assert_eq!(err.to_string(), "Skill execution failed: boom");
        assert_eq!(skill.calls()[0].query, "q");
    }

    #[tokio::test]
    async fn test_static_analyzer_restamps_query() {
        let intent = EnrichedIntent::assemble(
            "template",
            None,
            SynthesisResult::unable_to_determine("x"),
            SubAgentReports::default(),
        );
        let analyzer = StaticIntentAnalyzer::new(intent);

        let out = analyzer
            .analyze_intent(&SubAgentInput::new("Help me.").with_user_id("u1"))
            .await;

        assert_eq!(out.original_query, "Help me.");
        assert_eq!(out.user_id.as_deref(), Some("u1"));
        assert_eq!(analyzer.inputs().len(), 1);
    }
}
