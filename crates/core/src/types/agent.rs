use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Agent Lenses
// =============================================================================

/// The reasoning lens a sub-agent analyzes an utterance through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AgentKind {
    Analytical,
    Creative,
    Practical,
    Tax,
    SocialMedia,
    ContentCreation,
}

impl AgentKind {
    /// Every lens, core lenses first.
    pub const ALL: [AgentKind; 6] = [
        AgentKind::Analytical,
        AgentKind::Creative,
        AgentKind::Practical,
        AgentKind::Tax,
        AgentKind::SocialMedia,
        AgentKind::ContentCreation,
    ];

    /// Agent name used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            AgentKind::Analytical => "AnalyticalAgent",
            AgentKind::Creative => "CreativeAgent",
            AgentKind::Practical => "PracticalAgent",
            AgentKind::Tax => "TaxAgent",
            AgentKind::SocialMedia => "SocialMediaAgent",
            AgentKind::ContentCreation => "ContentCreationAgent",
        }
    }

    /// Gateway task identifier for this lens.
    pub fn task(&self) -> &'static str {
        match self {
            AgentKind::Analytical => "custom_analytical_analysis",
            AgentKind::Creative => "custom_creative_analysis",
            AgentKind::Practical => "custom_practical_analysis",
            AgentKind::Tax => "custom_tax_analysis",
            AgentKind::SocialMedia => "custom_social_media",
            AgentKind::ContentCreation => "custom_content_creation",
        }
    }

    /// Whether this is an optional domain specialist.
    pub fn is_specialist(&self) -> bool {
        !matches!(
            self,
            AgentKind::Analytical | AgentKind::Creative | AgentKind::Practical
        )
    }

    /// Parse a configuration name (`tax`, `social_media`, `socialMedia`, ...).
    pub fn from_config_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "analytical" => Some(AgentKind::Analytical),
            "creative" => Some(AgentKind::Creative),
            "practical" => Some(AgentKind::Practical),
            "tax" => Some(AgentKind::Tax),
            "socialmedia" => Some(AgentKind::SocialMedia),
            "contentcreation" => Some(AgentKind::ContentCreation),
            _ => None,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Shared verdict shapes
// =============================================================================

/// Analytical verdict on whether the request is clear and coherent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalConsistency {
    pub is_consistent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Practical verdict on whether the request makes sense in a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonSenseValidation {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A term the Creative lens considers subjective or ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguityFlag {
    pub term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Feasibility rating reported by the Practical lens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeasibilityRating {
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "low", alias = "LOW")]
    Low,
    #[default]
    #[serde(alias = "unknown", alias = "UNKNOWN")]
    Unknown,
}

/// Feasibility of a request given current tools and resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityAssessment {
    pub rating: FeasibilityRating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Rough effort estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeEstimate {
    #[serde(alias = "quick", alias = "QUICK")]
    Quick,
    #[serde(alias = "moderate", alias = "MODERATE")]
    Moderate,
    #[serde(alias = "significant", alias = "SIGNIFICANT")]
    Significant,
    #[default]
    #[serde(alias = "unknown", alias = "UNKNOWN")]
    Unknown,
}

/// Time and tooling a request implies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceImplications {
    #[serde(default)]
    pub time_estimate: TimeEstimate,
    #[serde(default)]
    pub tools_needed: Vec<String>,
}

/// A post proposed by the social-media specialist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPost {
    pub platform: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
}

// =============================================================================
// Per-lens records
// =============================================================================
//
// Every field is always populated. `rawLLMResponse` is kept for audit
// regardless of parse success; `degradationReason` is set only when the
// record was filled from defaults after a failure.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticalResponse {
    pub identified_entities: Vec<String>,
    pub explicit_tasks: Vec<String>,
    pub information_needed: Vec<String>,
    pub logical_consistency: LogicalConsistency,
    pub problem_type: String,
    #[serde(rename = "rawLLMResponse")]
    pub raw_llm_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degradation_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeResponse {
    pub alternative_goals: Vec<String>,
    pub novel_solutions_suggested: Vec<String>,
    pub unstated_assumptions: Vec<String>,
    pub potential_enhancements: Vec<String>,
    pub ambiguity_flags: Vec<AmbiguityFlag>,
    #[serde(rename = "rawLLMResponse")]
    pub raw_llm_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degradation_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticalResponse {
    pub contextual_factors: Vec<String>,
    pub feasibility_assessment: FeasibilityAssessment,
    pub efficiency_tips: Vec<String>,
    pub resource_implications: ResourceImplications,
    pub common_sense_validation: CommonSenseValidation,
    #[serde(rename = "rawLLMResponse")]
    pub raw_llm_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degradation_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResponse {
    pub is_tax_related: bool,
    pub tax_topics: Vec<String>,
    pub jurisdiction: String,
    pub requires_professional_advice: bool,
    pub suggested_skills: Vec<String>,
    #[serde(rename = "rawLLMResponse")]
    pub raw_llm_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degradation_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMediaResponse {
    pub is_social_media_related: bool,
    pub platforms: Vec<String>,
    pub scheduled_posts: Vec<ScheduledPost>,
    pub engagement_summary: String,
    #[serde(rename = "rawLLMResponse")]
    pub raw_llm_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degradation_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCreationResponse {
    pub is_content_creation_related: bool,
    pub content_type: String,
    pub generated_content: String,
    pub key_points: Vec<String>,
    #[serde(rename = "rawLLMResponse")]
    pub raw_llm_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degradation_reason: Option<String>,
}

/// One reasoning agent's output, tagged by lens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "agent", rename_all = "camelCase")]
pub enum AgentResponse {
    Analytical(AnalyticalResponse),
    Creative(CreativeResponse),
    Practical(PracticalResponse),
    Tax(TaxResponse),
    SocialMedia(SocialMediaResponse),
    ContentCreation(ContentCreationResponse),
}

impl AgentResponse {
    /// The lens that produced this record.
    pub fn kind(&self) -> AgentKind {
        match self {
            AgentResponse::Analytical(_) => AgentKind::Analytical,
            AgentResponse::Creative(_) => AgentKind::Creative,
            AgentResponse::Practical(_) => AgentKind::Practical,
            AgentResponse::Tax(_) => AgentKind::Tax,
            AgentResponse::SocialMedia(_) => AgentKind::SocialMedia,
            AgentResponse::ContentCreation(_) => AgentKind::ContentCreation,
        }
    }

    /// The raw generated text kept for audit.
    pub fn raw_llm_response(&self) -> &str {
        match self {
            AgentResponse::Analytical(r) => &r.raw_llm_response,
            AgentResponse::Creative(r) => &r.raw_llm_response,
            AgentResponse::Practical(r) => &r.raw_llm_response,
            AgentResponse::Tax(r) => &r.raw_llm_response,
            AgentResponse::SocialMedia(r) => &r.raw_llm_response,
            AgentResponse::ContentCreation(r) => &r.raw_llm_response,
        }
    }

    /// Why the record was filled from defaults, if it was.
    pub fn degradation_reason(&self) -> Option<&str> {
        match self {
            AgentResponse::Analytical(r) => r.degradation_reason.as_deref(),
            AgentResponse::Creative(r) => r.degradation_reason.as_deref(),
            AgentResponse::Practical(r) => r.degradation_reason.as_deref(),
            AgentResponse::Tax(r) => r.degradation_reason.as_deref(),
            AgentResponse::SocialMedia(r) => r.degradation_reason.as_deref(),
            AgentResponse::ContentCreation(r) => r.degradation_reason.as_deref(),
        }
    }

    /// Whether the record holds fallback defaults rather than an analysis.
    pub fn is_degraded(&self) -> bool {
        self.degradation_reason().is_some()
    }
}

// =============================================================================
// Fan-in collection
// =============================================================================

/// Every sub-agent record collected for one request. Lenses that were not
/// run (or whose agent panicked) stay `None` and serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAgentReports {
    pub analytical: Option<AnalyticalResponse>,
    pub creative: Option<CreativeResponse>,
    pub practical: Option<PracticalResponse>,
    pub tax: Option<TaxResponse>,
    pub social_media: Option<SocialMediaResponse>,
    pub content_creation: Option<ContentCreationResponse>,
}

impl SubAgentReports {
    /// Store a record in the slot for its lens.
    pub fn insert(&mut self, response: AgentResponse) {
        match response {
            AgentResponse::Analytical(r) => self.analytical = Some(r),
            AgentResponse::Creative(r) => self.creative = Some(r),
            AgentResponse::Practical(r) => self.practical = Some(r),
            AgentResponse::Tax(r) => self.tax = Some(r),
            AgentResponse::SocialMedia(r) => self.social_media = Some(r),
            AgentResponse::ContentCreation(r) => self.content_creation = Some(r),
        }
    }

    /// Degradation reason per populated slot, `None` for a healthy record.
    fn slots(&self) -> [(AgentKind, Option<Option<&str>>); 6] {
        [
            (AgentKind::Analytical, self.analytical.as_ref().map(|r| r.degradation_reason.as_deref())),
            (AgentKind::Creative, self.creative.as_ref().map(|r| r.degradation_reason.as_deref())),
            (AgentKind::Practical, self.practical.as_ref().map(|r| r.degradation_reason.as_deref())),
            (AgentKind::Tax, self.tax.as_ref().map(|r| r.degradation_reason.as_deref())),
            (AgentKind::SocialMedia, self.social_media.as_ref().map(|r| r.degradation_reason.as_deref())),
            (
                AgentKind::ContentCreation,
                self.content_creation.as_ref().map(|r| r.degradation_reason.as_deref()),
            ),
        ]
    }

    /// Lenses with a record present.
    pub fn present(&self) -> Vec<AgentKind> {
        self.slots()
            .into_iter()
            .filter_map(|(kind, slot)| slot.map(|_| kind))
            .collect()
    }

    /// Number of records that hold a real (non-degraded) analysis.
    pub fn healthy_count(&self) -> usize {
        self.slots()
            .into_iter()
            .filter(|(_, slot)| matches!(slot, Some(None)))
            .count()
    }

    /// Degraded lenses with their reasons.
    pub fn degraded(&self) -> Vec<(AgentKind, String)> {
        self.slots()
            .into_iter()
            .filter_map(|(kind, slot)| match slot {
                Some(Some(reason)) => Some((kind, reason.to_string())),
                _ => None,
            })
            .collect()
    }
}
