//! Knowledge base backing the Learning & Guidance skill.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use atom_core::Result;

/// One step of a how-to, tutorial or workflow article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleStep {
    pub title: String,
    pub description: String,
}

/// A knowledge-base article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    /// `how-to`, `tutorial`, `faq`, `explanation` or `workflow_guide`.
    pub content_type: String,
    /// Application the article is about; `General` applies everywhere.
    pub application: String,
    pub keywords: Vec<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<ArticleStep>,
    pub difficulty: String,
}

impl Article {
    /// The first `n` characters of the content.
    pub fn excerpt(&self, n: usize) -> String {
        self.content.chars().take(n).collect()
    }

    fn applies_to(&self, application: &str) -> bool {
        self.application.eq_ignore_ascii_case(application) || self.application == "General"
    }
}

/// Parameters of a knowledge search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub application_context: Option<String>,
    pub content_type: Option<String>,
    pub max_results: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            application_context: None,
            content_type: None,
            max_results: 3,
        }
    }

    pub fn with_application_context(mut self, context: Option<String>) -> Self {
        self.application_context = context;
        self
    }

    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Source of guidance articles.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Articles relevant to the request, most relevant first.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Article>>;
}

/// Keyword-scored in-memory knowledge base.
pub struct InMemoryKnowledgeBase {
    articles: Arc<Vec<Article>>,
}

impl InMemoryKnowledgeBase {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            articles: Arc::new(articles),
        }
    }

    /// The five built-in articles.
    pub fn with_default_articles() -> Self {
        Self::new(default_articles())
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

impl Default for InMemoryKnowledgeBase {
    fn default() -> Self {
        Self::with_default_articles()
    }
}

#[async_trait]
impl KnowledgeBase for InMemoryKnowledgeBase {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Article>> {
        let query = request.query.to_lowercase();
        let keywords: Vec<&str> = query.split_whitespace().filter(|kw| kw.chars().count() > 2).collect();

        let mut scored: Vec<(u32, &Article)> = self
            .articles
            .iter()
            .filter(|a| {
                request
                    .application_context
                    .as_deref()
                    .map_or(true, |app| a.applies_to(app))
            })
            .filter(|a| {
                request
                    .content_type
                    .as_deref()
                    .map_or(true, |ct| a.content_type == ct)
            })
            .map(|a| (score(a, &query, &keywords), a))
            .filter(|(score, _)| *score > 0)
            .collect();

        // Stable, so ties keep catalogue order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        tracing::debug!(
            query = %request.query,
            matches = scored.len(),
            "Knowledge search"
        );

        Ok(scored
            .into_iter()
            .take(request.max_results)
            .map(|(_, article)| article.clone())
            .collect())
    }
}

/// Title hit +3, keyword hit +2, hit in the first 300 content characters +1,
/// plus 2 when the query names the article's content type.
fn score(article: &Article, query: &str, keywords: &[&str]) -> u32 {
    let title = article.title.to_lowercase();
    let head = article.excerpt(300).to_lowercase();
    let article_keywords: Vec<String> = article.keywords.iter().map(|k| k.to_lowercase()).collect();

    let mut score = 0;
    for kw in keywords {
        if title.contains(kw) {
            score += 3;
        }
        if article_keywords.iter().any(|k| k.contains(kw)) {
            score += 2;
        }
        if head.contains(kw) {
            score += 1;
        }
    }
    if query.contains(article.content_type.as_str()) {
        score += 2;
    }
    score
}

fn steps(pairs: &[(&str, &str)]) -> Vec<ArticleStep> {
    pairs
        .iter()
        .map(|(title, description)| ArticleStep {
            title: title.to_string(),
            description: description.to_string(),
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn article(
    id: &str,
    title: &str,
    content_type: &str,
    application: &str,
    keywords: &[&str],
    content: &str,
    steps: Vec<ArticleStep>,
    difficulty: &str,
) -> Article {
    Article {
        id: id.to_string(),
        title: title.to_string(),
        content_type: content_type.to_string(),
        application: application.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        content: content.to_string(),
        steps,
        difficulty: difficulty.to_string(),
    }
}

/// Built-in catalogue.
pub fn default_articles() -> Vec<Article> {
    vec![
        article(
            "kb_001",
            "How to Create Pivot Tables in SpreadsheetApp",
            "how-to",
            "SpreadsheetApp",
            &["pivot table", "spreadsheet", "data analysis", "report"],
            "Pivot tables are a powerful tool for summarizing and analyzing large datasets. This guide explains how to create them in SpreadsheetApp.",
            steps(&[
                ("Select Your Data", "Click on any cell within the data range you want to analyze."),
                ("Insert Pivot Table", "Go to the 'Insert' menu and choose 'PivotTable'."),
                (
                    "Configure Fields",
                    "In the PivotTable editor pane, drag fields into Rows, Columns, Values, and Filters areas.",
                ),
                ("Customize", "Use options to sort, filter, and format your pivot table."),
            ]),
            "intermediate",
        ),
        article(
            "kb_002",
            "Tutorial: Email Merge with Attachments",
            "tutorial",
            "EmailClient",
            &["email merge", "mail merge", "attachments", "bulk email", "tutorial"],
            "This tutorial walks you through performing an email merge operation with personalized attachments using EmailClient and SpreadsheetApp for data.",
            steps(&[
                (
                    "Prepare Data Source",
                    "Create a spreadsheet with recipient emails, names, and attachment file paths.",
                ),
                ("Open EmailClient Merge Tool", "In EmailClient, find the 'Mail Merge Wizard' under 'Tools'."),
                ("Connect Data Source", "Link your spreadsheet to the wizard."),
                (
                    "Compose Template",
                    "Write your email template using placeholders for personalized fields (e.g., {{FirstName}}).",
                ),
                (
                    "Configure Attachments",
                    "Specify the column in your spreadsheet that contains the path to each recipient's attachment.",
                ),
                ("Preview and Send", "Review a few merged emails then start the send process."),
            ]),
            "intermediate",
        ),
        article(
            "kb_003",
            "FAQ: Common Login Issues",
            "faq",
            "General",
            &["login", "password", "access denied", "troubleshooting", "faq"],
            "Q: I forgot my password. How do I reset it?\nA: Click the 'Forgot Password' link on the login page and follow the instructions sent to your email.\n\nQ: Why am I seeing 'Access Denied' errors?\nA: This could be due to incorrect credentials, insufficient permissions, or network issues. Verify your username and password, and contact support if the problem persists.\n\nQ: What are the password requirements?\nA: Passwords must be at least 12 characters and include uppercase and lowercase letters, numbers and symbols.",
            Vec::new(),
            "beginner",
        ),
        article(
            "kb_004",
            "Understanding Conditional Formatting",
            "explanation",
            "SpreadsheetApp",
            &["conditional formatting", "spreadsheet", "data visualization", "rules"],
            "Conditional formatting allows you to automatically apply formatting (like colors, icons, and data bars) to cells that meet certain criteria. This helps in visualizing data, highlighting important information, and identifying trends. You can set up rules based on cell values, formulas, or dates. Common uses include highlighting cells greater than a certain number, color-coding sales performance, or identifying duplicate values.",
            Vec::new(),
            "beginner",
        ),
        article(
            "kb_005",
            "Workflow Guide: New Client Onboarding",
            "workflow_guide",
            "CRM_Platform",
            &["client onboarding", "crm", "workflow", "new customer", "process"],
            "This guide outlines the standard procedure for onboarding new clients in the CRM_Platform.",
            steps(&[
                ("Receive Lead", "New lead is captured from web form or manual entry."),
                (
                    "Initial Contact & Qualification",
                    "Sales rep makes initial contact within 24 hours to qualify the lead.",
                ),
                ("Needs Assessment Meeting", "Schedule and conduct a meeting to understand client requirements."),
                ("Proposal Creation", "Generate a tailored proposal in the CRM using approved templates."),
                ("Contract & Signature", "Send contract for e-signature via integrated tool."),
                ("Project Kickoff", "Once signed, schedule internal and client kickoff meetings."),
                ("CRM Record Update", "Update client status to 'Active' and populate all relevant fields."),
            ]),
            "intermediate",
        ),
    ]
}
