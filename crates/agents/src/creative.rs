use std::sync::Arc;

use atom_core::decode::{list_field, Fields};
use atom_core::types::{AgentKind, AgentResponse, CreativeResponse};

use crate::fixtures::CannedResponseTable;
use crate::lens::{Degradation, Lens, LensAgent};

/// Looks past the literal request: deeper goals, novel approaches, hidden
/// assumptions and ambiguous terms.
pub struct CreativeLens;

pub type CreativeAgent = LensAgent<CreativeLens>;

const TEMPLATE: &str = r#"You are the Creative Intelligence Agent. Think beyond the literal wording of the user's query.
Focus on:
1. Alternative Goals: the deeper, unstated goal the user might have.
2. Novel Solutions: new approaches or combinations of tools and features.
3. Unstated Assumptions: assumptions the user may be making.
4. Potential Enhancements: related value-adds or next steps.
5. Ambiguity Flags: subjective or ambiguous terms that allow several interpretations.

Return your analysis ONLY as a valid JSON object with this structure. Use an empty array when nothing applies.
{
  "alternativeGoals": ["string"],
  "novelSolutionsSuggested": ["string"],
  "unstatedAssumptions": ["string"],
  "potentialEnhancements": ["string"],
  "ambiguityFlags": [
    { "term": "string", "reason": "string" }
  ]
}

Your entire response must be the JSON object itself.
User's query: "{{ user_input }}"
"#;

impl Lens for CreativeLens {
    const KIND: AgentKind = AgentKind::Creative;
    const TEMPLATE: &'static str = TEMPLATE;

    type Record = CreativeResponse;

    fn from_fields(fields: &Fields, raw: String) -> CreativeResponse {
        CreativeResponse {
            alternative_goals: list_field(fields, "alternativeGoals"),
            novel_solutions_suggested: list_field(fields, "novelSolutionsSuggested"),
            unstated_assumptions: list_field(fields, "unstatedAssumptions"),
            potential_enhancements: list_field(fields, "potentialEnhancements"),
            ambiguity_flags: list_field(fields, "ambiguityFlags"),
            raw_llm_response: raw,
            degradation_reason: None,
        }
    }

    fn degraded(cause: &Degradation, raw: String) -> CreativeResponse {
        let marker = match cause {
            Degradation::Unparsable(_) => "Error: Failed to parse LLM JSON response.",
            _ => "Error: LLM analysis failed or no content.",
        };
        CreativeResponse {
            alternative_goals: vec![marker.to_string()],
            novel_solutions_suggested: Vec::new(),
            unstated_assumptions: Vec::new(),
            potential_enhancements: Vec::new(),
            ambiguity_flags: Vec::new(),
            raw_llm_response: raw,
            degradation_reason: Some(cause.reason()),
        }
    }

    fn into_response(record: CreativeResponse) -> AgentResponse {
        AgentResponse::Creative(record)
    }
}

impl CreativeAgent {
    /// Answer the known sample utterances from canned content.
    pub fn with_sample_fixtures(self) -> Self {
        self.with_fixtures(Arc::new(CannedResponseTable::creative_samples()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::AgentSettings;
    use atom_core::mocks::{FailingGateway, ScriptedGateway};
    use atom_core::types::{AmbiguityFlag, SubAgentInput};
    use tokio_util::sync::CancellationToken;

    const TASK: &str = "custom_creative_analysis";

    #[tokio::test]
    async fn test_parses_ambiguity_flags() {
        let gateway = Arc::new(ScriptedGateway::new().with_content(
            TASK,
            r#"```json
{"alternativeGoals":["create a chart"],"ambiguityFlags":[{"term":"stuff","reason":"vague"}]}
```"#,
        ));
        let agent = CreativeAgent::new(gateway.clone(), AgentSettings::new("m", 0.8));

        let record = agent
            .run(&SubAgentInput::new("Help me fix stuff."), &CancellationToken::new())
            .await;

        assert_eq!(record.alternative_goals, vec!["create a chart"]);
        assert_eq!(
            record.ambiguity_flags,
            vec![AmbiguityFlag {
                term: "stuff".into(),
                reason: Some("vague".into())
            }]
        );
        assert!(record.novel_solutions_suggested.is_empty());
        assert_eq!(gateway.calls()[0].options.temperature, Some(0.8));
    }

    #[tokio::test]
    async fn test_malformed_flag_does_not_drop_valid_ones() {
        let gateway = Arc::new(ScriptedGateway::new().with_content(
            TASK,
            r#"{"ambiguityFlags":[{"term":"soon","reason":"vague time"},"stuff"],"alternativeGoals":["plan a launch", 7]}"#,
        ));
        let agent = CreativeAgent::new(gateway, AgentSettings::new("m", 0.8));

        let record = agent
            .run(&SubAgentInput::new("Ship it soon"), &CancellationToken::new())
            .await;

        assert_eq!(
            record.ambiguity_flags,
            vec![AmbiguityFlag {
                term: "soon".into(),
                reason: Some("vague time".into())
            }]
        );
        assert_eq!(record.alternative_goals, vec!["plan a launch"]);
    }

    #[tokio::test]
    async fn test_failure_marker() {
        let agent = CreativeAgent::new(Arc::new(FailingGateway::new("boom")), AgentSettings::new("m", 0.8));

        let record = agent
            .run(&SubAgentInput::new("anything"), &CancellationToken::new())
            .await;

        assert_eq!(record.alternative_goals, vec!["Error: LLM analysis failed or no content."]);
        assert_eq!(record.degradation_reason.as_deref(), Some("LLM analysis failed: boom"));
    }

    #[tokio::test]
    async fn test_sample_fixture_skips_gateway() {
        let gateway = Arc::new(ScriptedGateway::new());
        let agent = CreativeAgent::new(gateway.clone(), AgentSettings::new("m", 0.8)).with_sample_fixtures();

        let record = agent
            .run(&SubAgentInput::new("help   me"), &CancellationToken::new())
            .await;

        assert!(gateway.calls().is_empty());
        assert_eq!(record.ambiguity_flags[0].term, "help");
        assert!(record.degradation_reason.is_none());
    }

    #[tokio::test]
    async fn test_fixture_miss_uses_gateway() {
        let gateway = Arc::new(ScriptedGateway::new().with_content(TASK, "{}"));
        let agent = CreativeAgent::new(gateway.clone(), AgentSettings::new("m", 0.8)).with_sample_fixtures();

        agent
            .run(&SubAgentInput::new("Draft a tweet"), &CancellationToken::new())
            .await;

        assert_eq!(gateway.calls().len(), 1);
    }
}
