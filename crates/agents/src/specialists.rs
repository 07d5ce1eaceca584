//! Optional domain specialists run alongside the core lenses.

use atom_core::decode::{field, list_field, text_field, Fields};
use atom_core::types::{
    AgentKind, AgentResponse, ContentCreationResponse, SocialMediaResponse, TaxResponse,
};

use crate::lens::{Degradation, Lens, LensAgent};

// =============================================================================
// Tax
// =============================================================================

pub struct TaxLens;

pub type TaxAgent = LensAgent<TaxLens>;

const TAX_TEMPLATE: &str = r#"You are the Tax Specialist Agent. Decide whether the user's query concerns taxes and, if so, which topics.
Return ONLY a valid JSON object with this structure:
{
  "isTaxRelated": true,
  "taxTopics": ["deductions", "filing deadlines"],
  "jurisdiction": "country or region, or unknown",
  "requiresProfessionalAdvice": false,
  "suggestedSkills": ["skill id"]
}
User's query: "{{ user_input }}"
"#;

impl Lens for TaxLens {
    const KIND: AgentKind = AgentKind::Tax;
    const TEMPLATE: &'static str = TAX_TEMPLATE;

    type Record = TaxResponse;

    fn from_fields(fields: &Fields, raw: String) -> TaxResponse {
        TaxResponse {
            is_tax_related: field(fields, "isTaxRelated").unwrap_or(false),
            tax_topics: list_field(fields, "taxTopics"),
            jurisdiction: text_field(fields, "jurisdiction").unwrap_or_else(|| "unknown".to_string()),
            requires_professional_advice: field(fields, "requiresProfessionalAdvice").unwrap_or(false),
            suggested_skills: list_field(fields, "suggestedSkills"),
            raw_llm_response: raw,
            degradation_reason: None,
        }
    }

    fn degraded(cause: &Degradation, raw: String) -> TaxResponse {
        TaxResponse {
            is_tax_related: false,
            tax_topics: Vec::new(),
            jurisdiction: "unknown".to_string(),
            requires_professional_advice: false,
            suggested_skills: Vec::new(),
            raw_llm_response: raw,
            degradation_reason: Some(cause.reason()),
        }
    }

    fn into_response(record: TaxResponse) -> AgentResponse {
        AgentResponse::Tax(record)
    }
}

// =============================================================================
// Social media
// =============================================================================

pub struct SocialMediaLens;

pub type SocialMediaAgent = LensAgent<SocialMediaLens>;

const SOCIAL_MEDIA_TEMPLATE: &str = r#"You are the Social Media Agent. Decide whether the user's query is about social media and, if so, propose posts.
Return ONLY a valid JSON object with this structure:
{
  "isSocialMediaRelated": true,
  "platforms": ["Twitter"],
  "scheduledPosts": [
    { "platform": "Twitter", "content": "post text", "scheduledTime": "ISO-8601 timestamp" }
  ],
  "engagementSummary": "string"
}
User's query: "{{ user_input }}"
"#;

impl Lens for SocialMediaLens {
    const KIND: AgentKind = AgentKind::SocialMedia;
    const TEMPLATE: &'static str = SOCIAL_MEDIA_TEMPLATE;

    type Record = SocialMediaResponse;

    fn from_fields(fields: &Fields, raw: String) -> SocialMediaResponse {
        let scheduled_posts: Vec<_> = list_field(fields, "scheduledPosts");
        SocialMediaResponse {
            // Posts imply relevance when the flag is left out.
            is_social_media_related: field(fields, "isSocialMediaRelated")
                .unwrap_or(!scheduled_posts.is_empty()),
            platforms: list_field(fields, "platforms"),
            scheduled_posts,
            engagement_summary: text_field(fields, "engagementSummary").unwrap_or_default(),
            raw_llm_response: raw,
            degradation_reason: None,
        }
    }

    fn degraded(cause: &Degradation, raw: String) -> SocialMediaResponse {
        SocialMediaResponse {
            is_social_media_related: false,
            platforms: Vec::new(),
            scheduled_posts: Vec::new(),
            engagement_summary: String::new(),
            raw_llm_response: raw,
            degradation_reason: Some(cause.reason()),
        }
    }

    fn into_response(record: SocialMediaResponse) -> AgentResponse {
        AgentResponse::SocialMedia(record)
    }
}

// =============================================================================
// Content creation
// =============================================================================

pub struct ContentCreationLens;

pub type ContentCreationAgent = LensAgent<ContentCreationLens>;

const CONTENT_CREATION_TEMPLATE: &str = r#"You are the Content Creation Agent. Decide whether the user wants content written and, if so, draft it.
Return ONLY a valid JSON object with this structure:
{
  "isContentCreationRelated": true,
  "contentType": "blog post",
  "generatedContent": "string",
  "keyPoints": ["string"]
}
User's query: "{{ user_input }}"
"#;

impl Lens for ContentCreationLens {
    const KIND: AgentKind = AgentKind::ContentCreation;
    const TEMPLATE: &'static str = CONTENT_CREATION_TEMPLATE;

    type Record = ContentCreationResponse;

    fn from_fields(fields: &Fields, raw: String) -> ContentCreationResponse {
        let generated_content = text_field(fields, "generatedContent").unwrap_or_default();
        ContentCreationResponse {
            is_content_creation_related: field(fields, "isContentCreationRelated")
                .unwrap_or(!generated_content.is_empty()),
            content_type: text_field(fields, "contentType").unwrap_or_else(|| "unknown".to_string()),
            generated_content,
            key_points: list_field(fields, "keyPoints"),
            raw_llm_response: raw,
            degradation_reason: None,
        }
    }

    fn degraded(cause: &Degradation, raw: String) -> ContentCreationResponse {
        ContentCreationResponse {
            is_content_creation_related: false,
            content_type: "unknown".to_string(),
            generated_content: String::new(),
            key_points: Vec::new(),
            raw_llm_response: raw,
            degradation_reason: Some(cause.reason()),
        }
    }

    fn into_response(record: ContentCreationResponse) -> AgentResponse {
        AgentResponse::ContentCreation(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::AgentSettings;
    use atom_core::mocks::ScriptedGateway;
    use atom_core::types::SubAgentInput;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn input() -> SubAgentInput {
        SubAgentInput::new("Schedule a tweet about our launch")
    }

    #[tokio::test]
    async fn test_social_media_infers_relevance_from_posts() {
        let gateway = Arc::new(ScriptedGateway::new().with_content(
            "custom_social_media",
            r#"{"scheduledPosts":[{"platform":"Twitter","content":"We launched!","scheduledTime":"2025-01-01T12:00:00Z"}],"engagementSummary":"One post queued."}"#,
        ));
        let record = SocialMediaAgent::new(gateway, AgentSettings::new("m", 0.5))
            .run(&input(), &CancellationToken::new())
            .await;

        assert!(record.is_social_media_related);
        assert_eq!(record.scheduled_posts[0].platform, "Twitter");
        assert_eq!(record.engagement_summary, "One post queued.");
    }

    #[tokio::test]
    async fn test_content_creation_defaults() {
        let gateway = Arc::new(ScriptedGateway::new().with_content("custom_content_creation", "{}"));
        let record = ContentCreationAgent::new(gateway, AgentSettings::new("m", 0.5))
            .run(&input(), &CancellationToken::new())
            .await;

        assert!(!record.is_content_creation_related);
        assert_eq!(record.content_type, "unknown");
        assert!(record.key_points.is_empty());
    }

    #[tokio::test]
    async fn test_tax_failure_is_not_tax_related() {
        let gateway = Arc::new(ScriptedGateway::new());
        let record = TaxAgent::new(gateway, AgentSettings::new("m", 0.5))
            .run(&input(), &CancellationToken::new())
            .await;

        assert!(!record.is_tax_related);
        assert_eq!(record.jurisdiction, "unknown");
        assert!(record
            .degradation_reason
            .unwrap()
            .contains("No script for task custom_tax_analysis"));
    }
}
