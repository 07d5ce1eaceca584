use atom_core::decode::{field, list_field, object_field, text_field, Fields};
use atom_core::types::{AgentKind, AgentResponse, AnalyticalResponse, LogicalConsistency};

use crate::lens::{Degradation, Lens, LensAgent};

/// Identifies entities, explicit tasks and missing information, and judges
/// whether the request is logically consistent.
pub struct AnalyticalLens;

pub type AnalyticalAgent = LensAgent<AnalyticalLens>;

const TEMPLATE: &str = r#"You are the Analytical Intelligence Agent. Break the user's query down into its core components.
Focus on:
1. Entities: key nouns, concepts, project names, dates and specific items mentioned.
2. Explicit Tasks: actions the user explicitly says they want to perform.
3. Information Needed: the specific information the user is looking for.
4. Logical Consistency: whether the request is clear, unambiguous and logically sound.
5. Problem Type: the general kind of problem (information_retrieval, task_execution, data_analysis, comparison, troubleshooting, how_to, content_creation, social_media_management, tax_question).

Return your analysis ONLY as a valid JSON object with this structure:
{
  "identifiedEntities": ["entity1", "entity2"],
  "explicitTasks": ["task description"],
  "informationNeeded": ["specific info"],
  "logicalConsistency": {
    "isConsistent": true,
    "reason": "explain when not consistent"
  },
  "problemType": "type_string"
}

Do not include any text outside the JSON object.
User's query: "{{ user_input }}"
UserId: {{ user_id }}
"#;

impl Lens for AnalyticalLens {
    const KIND: AgentKind = AgentKind::Analytical;
    const TEMPLATE: &'static str = TEMPLATE;

    type Record = AnalyticalResponse;

    fn from_fields(fields: &Fields, raw: String) -> AnalyticalResponse {
        AnalyticalResponse {
            identified_entities: list_field(fields, "identifiedEntities"),
            explicit_tasks: list_field(fields, "explicitTasks"),
            information_needed: list_field(fields, "informationNeeded"),
            logical_consistency: logical_consistency(object_field(fields, "logicalConsistency")),
            problem_type: text_field(fields, "problemType").unwrap_or_else(|| "unknown".to_string()),
            raw_llm_response: raw,
            degradation_reason: None,
        }
    }

    fn degraded(cause: &Degradation, raw: String) -> AnalyticalResponse {
        let reason = cause.reason();
        AnalyticalResponse {
            identified_entities: Vec::new(),
            explicit_tasks: Vec::new(),
            information_needed: Vec::new(),
            logical_consistency: LogicalConsistency {
                is_consistent: false,
                reason: Some(reason.clone()),
            },
            problem_type: "unknown".to_string(),
            raw_llm_response: raw,
            degradation_reason: Some(reason),
        }
    }

    fn into_response(record: AnalyticalResponse) -> AgentResponse {
        AgentResponse::Analytical(record)
    }
}

/// Missing parts of the verdict are back-filled independently.
fn logical_consistency(verdict: Option<&Fields>) -> LogicalConsistency {
    LogicalConsistency {
        is_consistent: verdict.and_then(|v| field(v, "isConsistent")).unwrap_or(true),
        reason: Some(
            verdict
                .and_then(|v| field(v, "reason"))
                .unwrap_or_else(|| "Consistency not specified by LLM.".to_string()),
        ),
    }
}
