//! Report endpoints.
//!
//! - `POST /api/reports`: JSON text or base64 file → processed record
//! - `POST /api/reports/upload`: multipart `file` → processed record
//! - `GET /api/reports`: summaries of stored reports
//! - `GET /api/reports/:id`: full record
//! - `PUT /api/reports/:id`: reprocess, replacing the record atomically
//! - `DELETE /api/reports/:id`: evict

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use base64::Engine;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Keywords, ReportRequest};
use crate::models::{ReportRecord, ReportSummary};

/// Report content as received.
enum ReportInput {
    Text(String),
    File(Vec<u8>),
}

/// Whether a write may create a record or must replace a stored one.
#[derive(Clone, Copy)]
enum Write {
    Create,
    Replace,
}

/// `POST /api/reports`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(req): Json<ReportRequest>,
) -> Result<(StatusCode, Json<Arc<ReportRecord>>), ApiError> {
    let id = Uuid::new_v4().to_string();
    let record = process(ctx, id, req, Write::Create).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `POST /api/reports/upload`: multipart with a `file` field and an
/// optional `keywords` field.
pub async fn upload(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Arc<ReportRecord>>), ApiError> {
    let mut file = None;
    let mut keywords = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid file field: {e}")))?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("keywords") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid keywords field: {e}")))?;
                keywords = Keywords::Raw(raw).into_list();
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("Missing multipart field `file`".into()))?;
    let id = Uuid::new_v4().to_string();
    let record = run(ctx, id, filename, ReportInput::File(bytes), keywords, Write::Create).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/reports`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<ReportSummary>>, ApiError> {
    Ok(Json(ctx.core.list_reports()?))
}

/// `GET /api/reports/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Arc<ReportRecord>>, ApiError> {
    Ok(Json(ctx.core.get_report(&id)?))
}

/// `PUT /api/reports/:id`: only existing reports can be reprocessed.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<Arc<ReportRecord>>, ApiError> {
    let record = process(ctx, id, req, Write::Replace).await?;
    Ok(Json(record))
}

/// `DELETE /api/reports/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.core.remove_report(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ═══════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════

async fn process(
    ctx: ApiContext,
    id: String,
    req: ReportRequest,
    write: Write,
) -> Result<Arc<ReportRecord>, ApiError> {
    let ReportRequest {
        filename,
        text,
        content_base64,
        keywords,
    } = req;

    let input = match (text, content_base64) {
        (Some(text), None) => ReportInput::Text(text),
        (None, Some(encoded)) => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| ApiError::BadRequest(format!("Invalid base64 content: {e}")))?;
            ReportInput::File(bytes)
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Provide exactly one of `text` or `content_base64`".into(),
            ))
        }
    };
    let keywords = keywords.map(Keywords::into_list).unwrap_or_default();
    run(ctx, id, filename, input, keywords, write).await
}

/// Processing is CPU-bound; keep it off the async workers.
async fn run(
    ctx: ApiContext,
    id: String,
    filename: String,
    input: ReportInput,
    keywords: Vec<String>,
    write: Write,
) -> Result<Arc<ReportRecord>, ApiError> {
    let filename = filename.trim().to_string();
    if filename.is_empty() {
        return Err(ApiError::BadRequest("Filename cannot be empty".into()));
    }

    let core = ctx.core.clone();
    let record = tokio::task::spawn_blocking(move || match (input, write) {
        (ReportInput::Text(text), Write::Create) => {
            core.process_report(&id, &filename, &text, &keywords)
        }
        (ReportInput::Text(text), Write::Replace) => {
            core.reprocess_report(&id, &filename, &text, &keywords)
        }
        (ReportInput::File(bytes), Write::Create) => {
            core.process_upload(&id, &filename, &bytes, &keywords)
        }
        (ReportInput::File(bytes), Write::Replace) => {
            core.reprocess_upload(&id, &filename, &bytes, &keywords)
        }
    })
    .await??;

    tracing::info!(
        report_id = %record.id,
        terms = record.terms.len(),
        conditions = record.conditions.len(),
        "Report stored"
    );
    Ok(record)
}
