//! `POST /api/reports/:id/chat`: ask a question about a stored report.
//!
//! Always answers: when the model backend is down the reply comes from the
//! extracted record and `source` is `"fallback"`.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ChatRequest, MAX_MESSAGE_CHARS};
use crate::pipeline::chat::ChatReply;

pub async fn send(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let message = req.message.trim().to_string();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".into()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Message too long (max {MAX_MESSAGE_CHARS} chars)"
        )));
    }

    // The model call blocks on HTTP.
    let core = ctx.core.clone();
    let reply =
        tokio::task::spawn_blocking(move || core.chat(&id, &message, &req.history)).await??;
    Ok(Json(reply))
}
