//! HTTP API over the report pipeline.
//!
//! Routes are nested under `/api/`. `api_router()` returns a composable
//! `Router`; `server` binds it and manages shutdown.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, ApiServer, ApiSession};
pub use types::ApiContext;
