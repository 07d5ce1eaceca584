//! Provider client contract sitting beneath the Gateway.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::TokenUsage;

/// A chat-capable model provider.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single-turn completion of a bare prompt.
    async fn complete(&self, prompt: &str) -> Result<LlmResponse>;

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Raw provider output before it is folded into a `GatewayResponse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}
