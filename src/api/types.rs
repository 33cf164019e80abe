//! Shared types for the API layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core_state::CoreState;
use crate::pipeline::chat::ChatTurn;
use crate::pipeline::extraction::parse_keywords;

/// Maximum chat message length in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;
/// Maximum request body (uploads included).
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

// ═══════════════════════════════════════════════════════════
// Request bodies
// ═══════════════════════════════════════════════════════════

/// `POST /api/reports` and `PUT /api/reports/:id`.
///
/// Exactly one of `text` or `content_base64` (a PDF or text file) is given.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub filename: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub content_base64: Option<String>,
    #[serde(default)]
    pub keywords: Option<Keywords>,
}

/// Augmenting keywords, as a list or as raw comma-separated model output.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Keywords {
    List(Vec<String>),
    Raw(String),
}

impl Keywords {
    pub fn into_list(self) -> Vec<String> {
        match self {
            Keywords::List(list) => list
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            Keywords::Raw(raw) => parse_keywords(&raw),
        }
    }
}

/// `POST /api/reports/:id/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

// ═══════════════════════════════════════════════════════════
// Response bodies
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub reports: usize,
    pub chat_model: String,
}
