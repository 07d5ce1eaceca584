//! Shared machinery of the reasoning agents.
//!
//! Each lens supplies its prompt template and how to turn decoded fields (or
//! a failure) into its record; `LensAgent` owns the Gateway call, the
//! fixture short-circuit, and degradation.

use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use atom_core::decode::{decode_object, Fields};
use atom_core::template::render_prompt;
use atom_core::traits::LanguageModelGateway;
use atom_core::types::{AgentKind, AgentResponse, GatewayRequest, SubAgentInput};
use atom_core::DecodeError;
use atom_governance::track_agent_run;

use crate::fixtures::ResponseFixtures;
use crate::invoke::{invoke_gateway, AgentSettings};

/// Reason used when a decoded field is absent.
pub const NOT_SPECIFIED: &str = "Not specified by LLM.";

/// Why a record was filled from defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum Degradation {
    /// Gateway failure, empty content, timeout or cancellation.
    Gateway(String),
    Unparsable(DecodeError),
    Template(String),
}

impl Degradation {
    pub fn reason(&self) -> String {
        match self {
            Degradation::Gateway(err) => format!("LLM analysis failed: {}", err),
            Degradation::Unparsable(err) => format!("Failed to parse LLM JSON response: {}", err),
            Degradation::Template(err) => format!("Prompt template error: {}", err),
        }
    }
}

/// One reasoning axis.
pub trait Lens: Send + Sync + 'static {
    const KIND: AgentKind;
    /// Tera template rendered with `user_input` and `user_id`.
    const TEMPLATE: &'static str;

    type Record: Send + 'static;

    /// Build a total record from decoded fields, back-filling defaults.
    fn from_fields(fields: &Fields, raw: String) -> Self::Record;

    /// Build the fallback record.
    fn degraded(cause: &Degradation, raw: String) -> Self::Record;

    fn into_response(record: Self::Record) -> AgentResponse;
}

/// A component producing one lens of analysis. Never fails.
#[async_trait]
pub trait ReasoningAgent: Send + Sync {
    fn kind(&self) -> AgentKind;

    async fn analyze_with_cancel(
        &self,
        input: &SubAgentInput,
        cancel: &CancellationToken,
    ) -> AgentResponse;

    async fn analyze(&self, input: &SubAgentInput) -> AgentResponse {
        let cancel = CancellationToken::new();
        self.analyze_with_cancel(input, &cancel).await
    }
}

/// Reasoning agent for lens `L`.
pub struct LensAgent<L: Lens> {
    gateway: Arc<dyn LanguageModelGateway>,
    settings: AgentSettings,
    fixtures: Option<Arc<dyn ResponseFixtures>>,
    _lens: PhantomData<L>,
}

impl<L: Lens> LensAgent<L> {
    pub fn new(gateway: Arc<dyn LanguageModelGateway>, settings: AgentSettings) -> Self {
        Self {
            gateway,
            settings,
            fixtures: None,
            _lens: PhantomData,
        }
    }

    /// Consult `fixtures` before calling the Gateway.
    pub fn with_fixtures(mut self, fixtures: Arc<dyn ResponseFixtures>) -> Self {
        self.fixtures = Some(fixtures);
        self
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// The rendered instruction for `input`.
    pub fn prompt(&self, input: &SubAgentInput) -> atom_core::Result<String> {
        render_prompt(
            L::TEMPLATE,
            &[
                ("user_input", input.user_input.as_str()),
                ("user_id", input.user_id_or_na()),
            ],
        )
    }

    /// Analyze `input` and return the lens's own record.
    pub async fn run(&self, input: &SubAgentInput, cancel: &CancellationToken) -> L::Record {
        let agent = L::KIND.name();

        let prompt = match self.prompt(input) {
            Ok(prompt) => prompt,
            Err(e) => return self.degrade(Degradation::Template(e.to_string()), String::new()),
        };

        if let Some(content) = self
            .fixtures
            .as_ref()
            .and_then(|f| f.lookup(L::KIND, input))
        {
            tracing::debug!(agent, "Using canned response");
            return self.parse(&content);
        }

        let request = GatewayRequest::prompted(L::KIND.task(), prompt, input.user_input.as_str());
        let response = invoke_gateway(self.gateway.as_ref(), &request, &self.settings, cancel).await;

        match response.usable_content() {
            Some(content) => self.parse(content),
            None => self.degrade(
                Degradation::Gateway(response.failure_reason()),
                response.audit_text(),
            ),
        }
    }

    fn parse(&self, content: &str) -> L::Record {
        match decode_object(content) {
            Ok(fields) => {
                track_agent_run(L::KIND.name(), "ok");
                L::from_fields(&fields, content.to_string())
            }
            Err(e) => self.degrade(Degradation::Unparsable(e), content.to_string()),
        }
    }

    fn degrade(&self, cause: Degradation, raw: String) -> L::Record {
        tracing::warn!(agent = L::KIND.name(), reason = %cause.reason(), "Agent degraded to defaults");
        track_agent_run(L::KIND.name(), "degraded");
        L::degraded(&cause, raw)
    }
}

#[async_trait]
impl<L: Lens> ReasoningAgent for LensAgent<L> {
    fn kind(&self) -> AgentKind {
        L::KIND
    }

    async fn analyze_with_cancel(
        &self,
        input: &SubAgentInput,
        cancel: &CancellationToken,
    ) -> AgentResponse {
        L::into_response(self.run(input, cancel).await)
    }
}
