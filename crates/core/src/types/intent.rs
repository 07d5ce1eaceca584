use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

use super::agent::{AmbiguityFlag, FeasibilityAssessment, SubAgentReports};

// =============================================================================
// Next Action (synthesis decision)
// =============================================================================

/// The five routing tags a synthesis decision may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    InvokeSkill,
    ClarifyQuery,
    PerformDirectAction,
    NoActionNeeded,
    UnableToDetermine,
}

impl ActionType {
    pub const ALL: [ActionType; 5] = [
        ActionType::InvokeSkill,
        ActionType::ClarifyQuery,
        ActionType::PerformDirectAction,
        ActionType::NoActionNeeded,
        ActionType::UnableToDetermine,
    ];

    /// Wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::InvokeSkill => "invoke_skill",
            ActionType::ClarifyQuery => "clarify_query",
            ActionType::PerformDirectAction => "perform_direct_action",
            ActionType::NoActionNeeded => "no_action_needed",
            ActionType::UnableToDetermine => "unable_to_determine",
        }
    }

    /// Validate a tag against the known set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged routing decision. Each variant carries only the fields that belong
/// to its tag, so fields of other tags cannot be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "actionType", rename_all = "snake_case")]
pub enum SuggestedNextAction {
    InvokeSkill {
        #[serde(rename = "skillId", default, skip_serializing_if = "Option::is_none")]
        skill_id: Option<String>,
        #[serde(default)]
        reason: String,
    },
    ClarifyQuery {
        #[serde(
            rename = "clarificationQuestion",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        clarification_question: Option<String>,
        #[serde(default)]
        reason: String,
    },
    PerformDirectAction {
        #[serde(
            rename = "directActionDetails",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        direct_action_details: Option<Value>,
        #[serde(default)]
        reason: String,
    },
    NoActionNeeded {
        #[serde(default)]
        reason: String,
    },
    UnableToDetermine {
        #[serde(default)]
        reason: String,
    },
}

impl SuggestedNextAction {
    /// The universal synthesis failure terminal state.
    pub fn unable_to_determine(reason: impl Into<String>) -> Self {
        SuggestedNextAction::UnableToDetermine {
            reason: reason.into(),
        }
    }

    /// The routing tag.
    pub fn action_type(&self) -> ActionType {
        match self {
            SuggestedNextAction::InvokeSkill { .. } => ActionType::InvokeSkill,
            SuggestedNextAction::ClarifyQuery { .. } => ActionType::ClarifyQuery,
            SuggestedNextAction::PerformDirectAction { .. } => ActionType::PerformDirectAction,
            SuggestedNextAction::NoActionNeeded { .. } => ActionType::NoActionNeeded,
            SuggestedNextAction::UnableToDetermine { .. } => ActionType::UnableToDetermine,
        }
    }

    /// Human-readable justification.
    pub fn reason(&self) -> &str {
        match self {
            SuggestedNextAction::InvokeSkill { reason, .. }
            | SuggestedNextAction::ClarifyQuery { reason, .. }
            | SuggestedNextAction::PerformDirectAction { reason, .. }
            | SuggestedNextAction::NoActionNeeded { reason }
            | SuggestedNextAction::UnableToDetermine { reason } => reason,
        }
    }
}

// =============================================================================
// Synthesis output
// =============================================================================

/// Clamp a confidence score into `[0, 1]`. Non-finite values are dropped.
pub fn clamp_confidence(value: f64) -> Option<f64> {
    if value.is_nan() {
        return None;
    }
    Some(value.clamp(0.0, 1.0))
}

/// The decision fragment produced by the synthesizing agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_goal_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extracted_parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identified_tasks: Vec<String>,
    pub suggested_next_action: SuggestedNextAction,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synthesis_log: Vec<String>,
}

impl SynthesisResult {
    /// A result that carries only the failure terminal state.
    pub fn unable_to_determine(reason: impl Into<String>) -> Self {
        Self {
            primary_goal: None,
            primary_goal_confidence: None,
            extracted_parameters: Map::new(),
            identified_tasks: Vec::new(),
            suggested_next_action: SuggestedNextAction::unable_to_determine(reason),
            synthesis_log: Vec::new(),
        }
    }
}

// =============================================================================
// Enriched Intent
// =============================================================================

/// Practical-lens details echoed onto the final intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticalConsiderations {
    pub feasibility: FeasibilityAssessment,
    pub efficiency_tips: Vec<String>,
}

/// The final per-utterance decision object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedIntent {
    pub request_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub original_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_goal_confidence: Option<f64>,
    #[serde(default)]
    pub extracted_parameters: Map<String, Value>,
    #[serde(default)]
    pub identified_tasks: Vec<String>,
    pub suggested_next_action: SuggestedNextAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_interpretations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_ambiguities: Option<Vec<AmbiguityFlag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practical_considerations: Option<PracticalConsiderations>,
    pub raw_sub_agent_responses: SubAgentReports,
    #[serde(default)]
    pub synthesis_log: Vec<String>,
}

impl EnrichedIntent {
    /// Assemble an intent from a synthesis fragment and the collected
    /// sub-agent records, echoing Creative and Practical details.
    pub fn assemble(
        original_query: impl Into<String>,
        user_id: Option<String>,
        synthesis: SynthesisResult,
        reports: SubAgentReports,
    ) -> Self {
        let alternative_interpretations = reports
            .creative
            .as_ref()
            .map(|c| c.alternative_goals.clone());
        let potential_ambiguities = reports.creative.as_ref().map(|c| c.ambiguity_flags.clone());
        let practical_considerations =
            reports.practical.as_ref().map(|p| PracticalConsiderations {
                feasibility: p.feasibility_assessment.clone(),
                efficiency_tips: p.efficiency_tips.clone(),
            });

        Self {
            request_id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            original_query: original_query.into(),
            user_id,
            primary_goal: synthesis.primary_goal,
            primary_goal_confidence: synthesis
                .primary_goal_confidence
                .and_then(clamp_confidence),
            extracted_parameters: synthesis.extracted_parameters,
            identified_tasks: synthesis.identified_tasks,
            suggested_next_action: synthesis.suggested_next_action,
            alternative_interpretations,
            potential_ambiguities,
            practical_considerations,
            raw_sub_agent_responses: reports,
            synthesis_log: synthesis.synthesis_log,
        }
    }

    /// The routing tag of the suggested next action.
    pub fn action_type(&self) -> ActionType {
        self.suggested_next_action.action_type()
    }
}
