//! Learning & Guidance skill: answers how-to, tutorial, workflow and
//! explanation requests from the knowledge base.
//!
//! The skill is the designated fallback for routing decisions that name no
//! skill. Per-article Gateway failures degrade to excerpts; only invalid
//! input and knowledge-base failures are errors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use atom_core::decode::{decode_object, field};
use atom_core::traits::{LanguageModelGateway, Skill};
use atom_core::types::{
    GatewayRequest, GatewayResponse, GenerationOptions, SkillInput, SkillOutput, DEFAULT_MODEL_FOR_AGENTS,
};
use atom_core::{Error, Result};
use atom_governance::track_gateway_latency;

use crate::knowledge::{Article, ArticleStep, KnowledgeBase, SearchRequest};

pub const LEARNING_AND_GUIDANCE_SKILL_ID: &str = "LearningAndGuidanceSkill";

const CLASSIFY_INSTRUCTION: &str = "Classify the user's request for help. Return ONLY a JSON object {\"guidanceType\": \"answer_question\" | \"find_tutorial\" | \"guide_workflow\" | \"general_explanation\"}.";
const ANSWER_INSTRUCTION: &str = "Answer the user's query using only the provided article text. Reply in plain text. If the text does not cover the query, say that the text does not appear to contain the answer.";
const EXPLAIN_INSTRUCTION: &str = "Explain the concept the user asks about in one short paragraph of plain text, using the provided article text.";
const STEPS_INSTRUCTION: &str = "Extract the ordered steps relevant to the user's query from the article text. Return ONLY a JSON object {\"steps\": [{\"title\": \"string\", \"description\": \"string\"}]}.";
const FOLLOWUP_INSTRUCTION: &str = "Suggest up to three short follow-up questions the user might ask next about the article. Return ONLY a JSON object {\"suggestions\": [\"string\"]}.";

/// What kind of help a request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceType {
    AnswerQuestion,
    FindTutorial,
    GuideWorkflow,
    GeneralExplanation,
}

impl GuidanceType {
    pub const ALL: [GuidanceType; 4] = [
        GuidanceType::AnswerQuestion,
        GuidanceType::FindTutorial,
        GuidanceType::GuideWorkflow,
        GuidanceType::GeneralExplanation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GuidanceType::AnswerQuestion => "answer_question",
            GuidanceType::FindTutorial => "find_tutorial",
            GuidanceType::GuideWorkflow => "guide_workflow",
            GuidanceType::GeneralExplanation => "general_explanation",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    fn wants_steps(&self) -> bool {
        matches!(self, GuidanceType::FindTutorial | GuidanceType::GuideWorkflow)
    }
}

impl fmt::Display for GuidanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guidance drawn from one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceItem {
    pub title: String,
    pub source_article_id: String,
    pub relevance_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<ArticleStep>>,
}

impl GuidanceItem {
    fn for_article(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            source_article_id: article.id.clone(),
            relevance_score: 0.6,
            content_snippet: None,
            steps: None,
        }
    }

    fn has_steps(&self) -> bool {
        self.steps.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// Structured result of one guidance request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceResult {
    pub original_query: String,
    pub guidance_type: GuidanceType,
    pub guidance_provided: Vec<GuidanceItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_suggestions: Option<Vec<String>>,
    pub search_performed_on: String,
}

impl GuidanceResult {
    /// The user-facing rendering of this result.
    pub fn render_message(&self) -> String {
        if self.guidance_provided.is_empty() {
            return format!(
                "I couldn't find specific guidance for \"{}\", but I'll keep learning!",
                self.original_query
            );
        }

        let mut message = format!("Here's what I found for \"{}\":\n", self.original_query);
        for item in &self.guidance_provided {
            message.push_str(&format!("\n{}\n", item.title));
            if let Some(snippet) = &item.content_snippet {
                message.push_str(&format!("{}\n", snippet));
            }
            for (i, step) in item.steps.iter().flatten().enumerate() {
                message.push_str(&format!("  {}. {}: {}\n", i + 1, step.title, step.description));
            }
        }
        if let Some(suggestions) = self.follow_up_suggestions.as_ref().filter(|s| !s.is_empty()) {
            message.push_str(&format!("\nYou might also ask: {}\n", suggestions.join("; ")));
        }
        message.trim_end().to_string()
    }
}

/// The Learning & Guidance skill.
pub struct LearningAndGuidanceSkill {
    gateway: Arc<dyn LanguageModelGateway>,
    knowledge: Arc<dyn KnowledgeBase>,
    model: String,
    max_results: usize,
}

impl LearningAndGuidanceSkill {
    pub fn new(gateway: Arc<dyn LanguageModelGateway>, knowledge: Arc<dyn KnowledgeBase>) -> Self {
        Self {
            gateway,
            knowledge,
            model: DEFAULT_MODEL_FOR_AGENTS.to_string(),
            max_results: 3,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Produce structured guidance for `input`.
    pub async fn guide(&self, input: &SkillInput) -> Result<GuidanceResult> {
        if input.query.trim().is_empty() || input.user_id.trim().is_empty() {
            return Err(Error::skill("Query and userId are required."));
        }

        let guidance_type = self.guidance_type(input).await;
        tracing::info!(
            user_id = %input.user_id,
            guidance_type = guidance_type.as_str(),
            "Providing guidance"
        );

        let max_results = field::<usize>(&input.parameters, "maxResults").unwrap_or(self.max_results);
        let request = SearchRequest::new(input.query.as_str())
            .with_application_context(input.application_context.clone())
            .with_content_type(field(&input.parameters, "preferContentType"))
            .with_max_results(max_results);
        let articles = self
            .knowledge
            .search(&request)
            .await
            .map_err(|e| Error::knowledge(e.to_string()))?;

        let mut guidance_provided = Vec::with_capacity(articles.len());
        for article in &articles {
            guidance_provided.push(self.guidance_for(article, &input.query, guidance_type).await);
        }

        let follow_up_suggestions = match guidance_provided.first() {
            Some(first) => self.follow_ups(&input.query, &first.title).await,
            None => None,
        };

        let query_head: String = input.query.chars().take(50).collect();
        Ok(GuidanceResult {
            original_query: input.query.clone(),
            guidance_type,
            guidance_provided,
            follow_up_suggestions,
            search_performed_on: format!(
                "{} articles from {} KB matching \"{}...\"",
                articles.len(),
                input.application_context.as_deref().unwrap_or("General"),
                query_head
            ),
        })
    }

    /// The hinted type if valid, else the Gateway's classification, else
    /// `answer_question`.
    async fn guidance_type(&self, input: &SkillInput) -> GuidanceType {
        if let Some(hint) = input.guidance_type_hint.as_deref() {
            match GuidanceType::from_tag(hint) {
                Some(t) => return t,
                None => tracing::warn!(hint, "Ignoring unknown guidance type hint"),
            }
        }

        let response = self
            .ask("classify_guidance_query", CLASSIFY_INSTRUCTION, json!({ "query": input.query }), true)
            .await;
        let Some(content) = response.usable_content() else {
            tracing::warn!(error = %response.failure_reason(), "Guidance classification failed");
            return GuidanceType::AnswerQuestion;
        };

        let classified = decode_object(content)
            .ok()
            .and_then(|fields| field::<String>(&fields, "guidanceType"))
            .and_then(|tag| GuidanceType::from_tag(&tag));
        classified.unwrap_or_else(|| {
            tracing::warn!(content, "Invalid guidance classification");
            GuidanceType::AnswerQuestion
        })
    }

    async fn guidance_for(&self, article: &Article, query: &str, guidance_type: GuidanceType) -> GuidanceItem {
        let mut item = GuidanceItem::for_article(article);

        if guidance_type.wants_steps() && !article.steps.is_empty() {
            item.steps = Some(article.steps.clone());
            item.content_snippet = Some(format!("Found relevant steps in \"{}\".", article.title));
            item.relevance_score = 0.85;
            return item;
        }

        let (task, instruction, text_len) = match guidance_type {
            GuidanceType::AnswerQuestion => ("answer_from_text", ANSWER_INSTRUCTION, 1500),
            GuidanceType::GeneralExplanation => ("summarize_for_explanation", EXPLAIN_INSTRUCTION, 1500),
            GuidanceType::FindTutorial | GuidanceType::GuideWorkflow => {
                ("extract_steps_from_text", STEPS_INSTRUCTION, 2000)
            }
        };
        let data = json!({
            "query": query,
            "textContent": article.excerpt(text_len),
            "articleTitle": article.title,
        });
        let response = self.ask(task, instruction, data, guidance_type.wants_steps()).await;

        match response.usable_content() {
            None => {
                tracing::warn!(
                    article = %article.id,
                    error = %response.failure_reason(),
                    "Article processing failed"
                );
                item.content_snippet = Some(format!("Error processing article \"{}\" for your query.", article.title));
            }
            Some(content) if guidance_type.wants_steps() => apply_steps(&mut item, article, query, content),
            Some(content) => {
                let lower = content.to_lowercase();
                if lower.starts_with("llm fallback") || lower.contains("not appear to contain") {
                    item.content_snippet = Some(format!(
                        "Article \"{}\" found, but specific info for \"{}\" not extracted. LLM said: {}",
                        article.title, query, content
                    ));
                } else {
                    item.content_snippet = Some(content.to_string());
                    item.relevance_score = 0.8;
                }
            }
        }

        if item.content_snippet.is_none() && !item.has_steps() {
            item.content_snippet = Some(format!(
                "Article \"{}\" may be relevant. Excerpt: {}...",
                article.title,
                article.excerpt(150)
            ));
        }
        item
    }

    async fn follow_ups(&self, query: &str, title: &str) -> Option<Vec<String>> {
        let data = json!({ "query": query, "articleTitle": title });
        let response = self
            .ask("generate_followup_suggestions", FOLLOWUP_INSTRUCTION, data, true)
            .await;
        let Some(content) = response.usable_content() else {
            tracing::debug!(error = %response.failure_reason(), "No follow-up suggestions");
            return None;
        };

        let fields = decode_object(content).ok()?;
        let suggestions: Vec<String> = fields
            .get("suggestions")?
            .as_array()?
            .iter()
            .filter_map(|s| s.as_str().map(str::to_string))
            .collect();
        (!suggestions.is_empty()).then_some(suggestions)
    }

    async fn ask(&self, task: &str, instruction: &str, data: Value, json_output: bool) -> GatewayResponse {
        let mut data = data;
        if let Value::Object(fields) = &mut data {
            fields.insert("system_prompt".to_string(), Value::String(instruction.to_string()));
        }
        let request = GatewayRequest::new(task, data);
        let options = GenerationOptions {
            temperature: Some(0.3),
            max_tokens: None,
            is_json_output: Some(json_output),
        };

        let started = Instant::now();
        let response = self.gateway.generate(&request, &self.model, options).await;
        track_gateway_latency(task, started.elapsed().as_secs_f64());
        response
    }
}

fn apply_steps(item: &mut GuidanceItem, article: &Article, query: &str, content: &str) {
    match decode_object(content) {
        Ok(fields) => match field::<Vec<ArticleStep>>(&fields, "steps").filter(|s| !s.is_empty()) {
            Some(steps) => {
                item.steps = Some(steps);
                item.content_snippet = Some("Extracted the following key steps:".to_string());
                item.relevance_score = 0.8;
            }
            None => {
                item.content_snippet = Some(format!(
                    "\"{}\" relevant, but specific steps for \"{}\" not extracted.",
                    article.title, query
                ));
            }
        },
        Err(e) => {
            tracing::warn!(article = %article.id, error = %e, "Unparsable steps");
            let head: String = content.chars().take(100).collect();
            item.content_snippet = Some(format!(
                "Could not parse steps for \"{}\". LLM response: {}...",
                article.title, head
            ));
        }
    }
}

#[async_trait]
impl Skill for LearningAndGuidanceSkill {
    fn id(&self) -> &str {
        LEARNING_AND_GUIDANCE_SKILL_ID
    }

    fn description(&self) -> &str {
        "Answers questions, finds tutorials, walks through workflows and explains concepts from the knowledge base"
    }

    async fn execute(&self, input: SkillInput) -> Result<SkillOutput> {
        let result = self.guide(&input).await?;
        let message = result.render_message();
        Ok(SkillOutput::text(message).with_data(serde_json::to_value(&result)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::InMemoryKnowledgeBase;
    use atom_core::mocks::ScriptedGateway;

    const PIVOT: &str = "How do I create a pivot table in SpreadsheetApp?";

    fn skill(gateway: Arc<ScriptedGateway>) -> LearningAndGuidanceSkill {
        LearningAndGuidanceSkill::new(gateway, Arc::new(InMemoryKnowledgeBase::default()))
    }

    fn input(query: &str) -> SkillInput {
        SkillInput::new("user-1", query).with_application_context(Some("SpreadsheetApp".into()))
    }

    #[tokio::test]
    async fn test_tutorial_hint_uses_predefined_steps() {
        let gateway = Arc::new(ScriptedGateway::new().with_content(
            "generate_followup_suggestions",
            r#"{"suggestions":["How do I refresh a pivot table?", 42]}"#,
        ));
        let skill = skill(gateway.clone());

        let output = skill
            .execute(input(PIVOT).with_guidance_type_hint(Some("find_tutorial".into())))
            .await
            .unwrap();

        assert!(output.message.starts_with("Here's what I found for"));
        assert!(output.message.contains("How to Create Pivot Tables in SpreadsheetApp"));
        assert!(output.message.contains("1. Select Your Data"));
        assert!(output.message.contains("You might also ask: How do I refresh a pivot table?"));

        let result: GuidanceResult = serde_json::from_value(output.data).unwrap();
        let first = &result.guidance_provided[0];
        assert_eq!(first.source_article_id, "kb_001");
        assert_eq!(first.relevance_score, 0.85);
        assert_eq!(first.steps.as_ref().unwrap().len(), 4);
        assert_eq!(result.follow_up_suggestions, Some(vec!["How do I refresh a pivot table?".to_string()]));
        // No classification call when a valid hint is supplied.
        assert!(gateway.calls_for("classify_guidance_query").is_empty());
    }

    #[tokio::test]
    async fn test_classification_drives_answer_path() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_content("classify_guidance_query", r#"{"guidanceType":"answer_question"}"#)
                .with_content("answer_from_text", "Use Insert > PivotTable."),
        );
        let skill = skill(gateway.clone());

        let result = skill.guide(&input(PIVOT)).await.unwrap();

        assert_eq!(result.guidance_type, GuidanceType::AnswerQuestion);
        let first = &result.guidance_provided[0];
        assert_eq!(first.content_snippet.as_deref(), Some("Use Insert > PivotTable."));
        assert_eq!(first.relevance_score, 0.8);

        let call = &gateway.calls_for("answer_from_text")[0];
        assert_eq!(call.request.data["articleTitle"], "How to Create Pivot Tables in SpreadsheetApp");
        assert_eq!(call.request.data["query"], PIVOT);
    }

    #[tokio::test]
    async fn test_invalid_classification_defaults_to_answer() {
        let gateway = Arc::new(
            ScriptedGateway::new().with_content("classify_guidance_query", r#"{"guidanceType":"dance"}"#),
        );

        let result = skill(gateway).guide(&input(PIVOT)).await.unwrap();

        assert_eq!(result.guidance_type, GuidanceType::AnswerQuestion);
        // answer_from_text is unscripted, so the article degrades.
        assert_eq!(
            result.guidance_provided[0].content_snippet.as_deref(),
            Some("Error processing article \"How to Create Pivot Tables in SpreadsheetApp\" for your query.")
        );
        assert_eq!(result.guidance_provided[0].relevance_score, 0.6);
    }

    #[tokio::test]
    async fn test_extracts_steps_for_articles_without_them() {
        let gateway = Arc::new(ScriptedGateway::new().with_content(
            "extract_steps_from_text",
            r#"{"steps":[{"title":"Open Format menu","description":"Choose Conditional formatting."}]}"#,
        ));
        let request = input("conditional formatting rules").with_guidance_type_hint(Some("find_tutorial".into()));

        let result = skill(gateway).guide(&request).await.unwrap();

        let item = result
            .guidance_provided
            .iter()
            .find(|g| g.source_article_id == "kb_004")
            .unwrap();
        assert_eq!(item.content_snippet.as_deref(), Some("Extracted the following key steps:"));
        assert_eq!(item.steps.as_ref().unwrap()[0].title, "Open Format menu");
    }

    #[tokio::test]
    async fn test_no_match_message() {
        let gateway = Arc::new(ScriptedGateway::new());

        let output = skill(gateway)
            .execute(
                SkillInput::new("user-1", "quantum chromodynamics")
                    .with_guidance_type_hint(Some("answer_question".into())),
            )
            .await
            .unwrap();

        assert_eq!(
            output.message,
            "I couldn't find specific guidance for \"quantum chromodynamics\", but I'll keep learning!"
        );
    }

    #[tokio::test]
    async fn test_rejects_missing_user() {
        let gateway = Arc::new(ScriptedGateway::new());

        let err = skill(gateway).execute(SkillInput::new("", PIVOT)).await.unwrap_err();

        assert!(matches!(err, Error::Skill(_)));
    }
}
