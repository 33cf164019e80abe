//! `GET /api/reports/:id/charts`: numeric chart inputs for one report.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::charts::{chart_inputs, ChartInputs};

pub async fn get(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<ChartInputs>, ApiError> {
    let record = ctx.core.get_report(&id)?;
    Ok(Json(chart_inputs(&record)))
}
