//! Conversational questions about a processed report.
//!
//! The language model is an external service. Every failure reaching it is
//! caught at [`ChatService`] and answered with a deterministic fallback built
//! from the record itself.

pub mod client;
pub mod fallback;
pub mod prompt;
pub mod service;

pub use client::{LlmClient, MockLlmClient, OllamaClient};
pub use fallback::fallback_reply;
pub use prompt::{build_prompt_context, PromptContext};
pub use service::{ChatReply, ChatService, ReplySource};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Chat backend not reachable at {0}")]
    Connection(String),

    #[error("Chat request timed out after {0}s")]
    Timeout(u64),

    #[error("Chat backend returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Chat response could not be parsed: {0}")]
    MalformedResponse(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}

impl ChatError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}
