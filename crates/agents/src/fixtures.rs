//! Canned responses keyed by request fingerprint.
//!
//! A fixture hit replaces the Gateway call; its content goes through the
//! same decode path as live output.

use serde_json::json;
use std::collections::HashMap;

use atom_core::types::{AgentKind, SubAgentInput};

/// Source of canned agent content.
pub trait ResponseFixtures: Send + Sync {
    /// Canned content for this lens and input, if any.
    fn lookup(&self, kind: AgentKind, input: &SubAgentInput) -> Option<String>;
}

/// Normalize an utterance: lowercase, trim, collapse inner whitespace and
/// drop trailing punctuation.
pub fn fingerprint(utterance: &str) -> String {
    let collapsed = utterance
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    collapsed
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .trim_end()
        .to_string()
}

/// Map-backed fixtures.
#[derive(Debug, Clone, Default)]
pub struct CannedResponseTable {
    entries: HashMap<(AgentKind, String), String>,
}

impl CannedResponseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; the utterance is fingerprinted.
    pub fn with(mut self, kind: AgentKind, utterance: &str, content: impl Into<String>) -> Self {
        self.insert(kind, utterance, content);
        self
    }

    pub fn insert(&mut self, kind: AgentKind, utterance: &str, content: impl Into<String>) {
        self.entries
            .insert((kind, fingerprint(utterance)), content.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Creative-lens answers for the known sample utterances.
    pub fn creative_samples() -> Self {
        let pivot = json!({
            "alternativeGoals": ["summarize sales data by region", "build a reusable report"],
            "novelSolutionsSuggested": ["start from a recommended pivot table layout"],
            "unstatedAssumptions": ["the data is already in a tabular range"],
            "potentialEnhancements": ["add a pivot chart", "apply conditional formatting to totals"],
            "ambiguityFlags": []
        })
        .to_string();

        Self::new()
            .with(
                AgentKind::Creative,
                "How can I make my Q3 marketing report generation more efficient, maybe using that new AI thing?",
                json!({
                    "alternativeGoals": [
                        "automate the Q3 report end to end",
                        "reduce manual data gathering for marketing reports"
                    ],
                    "novelSolutionsSuggested": [
                        "generate a draft narrative from campaign metrics",
                        "schedule the report to refresh from live data"
                    ],
                    "unstatedAssumptions": ["the report follows the same structure every quarter"],
                    "potentialEnhancements": ["share an auto-updating dashboard instead of a static report"],
                    "ambiguityFlags": [
                        {"term": "that new AI thing", "reason": "The specific AI tool is not named."},
                        {"term": "efficient", "reason": "Could mean faster, cheaper, or less manual work."}
                    ]
                })
                .to_string(),
            )
            .with(AgentKind::Creative, "How to create pivot table?", pivot.clone())
            .with(
                AgentKind::Creative,
                "How do I create a pivot table in SpreadsheetApp?",
                pivot,
            )
            .with(
                AgentKind::Creative,
                "Help me.",
                json!({
                    "alternativeGoals": ["get started with a feature", "fix a problem in a current task"],
                    "novelSolutionsSuggested": [],
                    "unstatedAssumptions": ["the assistant already knows the user's context"],
                    "potentialEnhancements": [],
                    "ambiguityFlags": [{"term": "help", "reason": "No task, subject, or application is given."}]
                })
                .to_string(),
            )
    }
}

impl ResponseFixtures for CannedResponseTable {
    fn lookup(&self, kind: AgentKind, input: &SubAgentInput) -> Option<String> {
        self.entries
            .get(&(kind, fingerprint(&input.user_input)))
            .cloned()
    }
}
