use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ChatError, ChatTurn};

/// A chat-completion backend.
pub trait LlmClient: Send + Sync {
    /// Send the conversation and return the assistant's reply text.
    fn chat(&self, model: &str, messages: &[ChatTurn]) -> Result<String, ChatError>;
}

/// Ollama HTTP client (`/api/chat`, non-streaming).
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ChatError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ChatError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Request body for Ollama /api/chat
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    stream: bool,
}

/// Response body from Ollama /api/chat
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

impl LlmClient for OllamaClient {
    fn chat(&self, model: &str, messages: &[ChatTurn]) -> Result<String, ChatError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = OllamaChatRequest {
            model,
            messages,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                ChatError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                ChatError::Timeout(self.timeout_secs)
            } else {
                ChatError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaChatResponse = response
            .json()
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;
        let reply = parsed.message.content.trim().to_string();
        if reply.is_empty() {
            return Err(ChatError::MalformedResponse("empty reply".into()));
        }
        Ok(reply)
    }
}

/// Mock LLM client for testing. Returns a configurable response or error
/// and records what it was sent.
pub struct MockLlmClient {
    response: Result<String, ChatError>,
    calls: AtomicUsize,
    last_messages: Mutex<Vec<ChatTurn>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self::with_result(Ok(response.to_string()))
    }

    pub fn failing(error: ChatError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(response: Result<String, ChatError>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_messages(&self) -> Vec<ChatTurn> {
        self.last_messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl LlmClient for MockLlmClient {
    fn chat(&self, _model: &str, messages: &[ChatTurn]) -> Result<String, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_messages.lock() {
            *last = messages.to_vec();
        }
        self.response.clone()
    }
}
