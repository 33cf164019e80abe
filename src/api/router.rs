//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::{ApiContext, MAX_BODY_BYTES};
use crate::core_state::CoreState;

/// Build the API router with all endpoints under `/api/`.
///
/// CORS is permissive: the chart front end is served separately.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/reports",
            get(endpoints::reports::list).post(endpoints::reports::create),
        )
        .route("/reports/upload", post(endpoints::reports::upload))
        .route(
            "/reports/:id",
            get(endpoints::reports::get)
                .put(endpoints::reports::update)
                .delete(endpoints::reports::remove),
        )
        .route("/reports/:id/charts", get(endpoints::charts::get))
        .route("/reports/:id/chat", post(endpoints::chat::send))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
}
