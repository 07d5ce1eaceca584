use atom_core::decode::{field, list_field, object_field, Fields};
use atom_core::types::{
    AgentKind, AgentResponse, CommonSenseValidation, FeasibilityAssessment, FeasibilityRating,
    PracticalResponse, ResourceImplications, TimeEstimate,
};

use crate::lens::{Degradation, Lens, LensAgent, NOT_SPECIFIED};

/// Grounds the request in the user's working reality: feasibility, effort,
/// tooling and common sense.
pub struct PracticalLens;

pub type PracticalAgent = LensAgent<PracticalLens>;

const TEMPLATE: &str = r#"You are the Practical Intelligence Agent. Assess the user's query from a real-world, common-sense perspective.
Focus on:
1. Contextual Factors: circumstances in the user's environment that affect the request.
2. Feasibility: whether the request can be done with typical tools and resources (High, Medium, Low or Unknown), why, and what it depends on.
3. Efficiency Tips: shortcuts or better ways to reach the same outcome.
4. Resource Implications: rough time needed (Quick, Moderate, Significant or Unknown) and tools involved.
5. Common Sense Validation: whether the request makes sense in a normal workflow.

Return your analysis ONLY as a valid JSON object with this structure:
{
  "contextualFactors": ["string"],
  "feasibilityAssessment": {
    "rating": "High",
    "reason": "string",
    "dependencies": ["string"]
  },
  "efficiencyTips": ["string"],
  "resourceImplications": {
    "timeEstimate": "Quick",
    "toolsNeeded": ["string"]
  },
  "commonSenseValidation": {
    "isValid": true,
    "reason": "string"
  }
}

Do not include any text outside the JSON object.
User's query: "{{ user_input }}"
UserId: {{ user_id }}
"#;

impl Lens for PracticalLens {
    const KIND: AgentKind = AgentKind::Practical;
    const TEMPLATE: &'static str = TEMPLATE;

    type Record = PracticalResponse;

    fn from_fields(fields: &Fields, raw: String) -> PracticalResponse {
        PracticalResponse {
            contextual_factors: list_field(fields, "contextualFactors"),
            feasibility_assessment: feasibility(object_field(fields, "feasibilityAssessment")),
            efficiency_tips: list_field(fields, "efficiencyTips"),
            resource_implications: resources(object_field(fields, "resourceImplications")),
            common_sense_validation: common_sense(object_field(fields, "commonSenseValidation")),
            raw_llm_response: raw,
            degradation_reason: None,
        }
    }

    fn degraded(cause: &Degradation, raw: String) -> PracticalResponse {
        let reason = cause.reason();
        PracticalResponse {
            contextual_factors: Vec::new(),
            feasibility_assessment: FeasibilityAssessment {
                rating: FeasibilityRating::Unknown,
                reason: Some(reason.clone()),
                dependencies: Vec::new(),
            },
            efficiency_tips: Vec::new(),
            resource_implications: Default::default(),
            common_sense_validation: CommonSenseValidation {
                is_valid: false,
                reason: Some(reason.clone()),
            },
            raw_llm_response: raw,
            degradation_reason: Some(reason),
        }
    }

    fn into_response(record: PracticalResponse) -> AgentResponse {
        AgentResponse::Practical(record)
    }
}

fn reason_or_unspecified(verdict: Option<&Fields>) -> Option<String> {
    Some(
        verdict
            .and_then(|v| field(v, "reason"))
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
    )
}

fn feasibility(verdict: Option<&Fields>) -> FeasibilityAssessment {
    FeasibilityAssessment {
        rating: verdict
            .and_then(|v| field(v, "rating"))
            .unwrap_or(FeasibilityRating::Unknown),
        reason: reason_or_unspecified(verdict),
        dependencies: verdict.map(|v| list_field(v, "dependencies")).unwrap_or_default(),
    }
}

fn resources(implications: Option<&Fields>) -> ResourceImplications {
    ResourceImplications {
        time_estimate: implications
            .and_then(|v| field(v, "timeEstimate"))
            .unwrap_or(TimeEstimate::Unknown),
        tools_needed: implications.map(|v| list_field(v, "toolsNeeded")).unwrap_or_default(),
    }
}

fn common_sense(verdict: Option<&Fields>) -> CommonSenseValidation {
    CommonSenseValidation {
        is_valid: verdict.and_then(|v| field(v, "isValid")).unwrap_or(true),
        reason: reason_or_unspecified(verdict),
    }
}
