pub mod api;
pub mod config;
pub mod core_state;
pub mod models;
pub mod pipeline;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Startup or serve failures surfaced to `main`.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Core(#[from] core_state::CoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn run() -> Result<(), RunError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env();
    tracing::info!(
        bind = %config.bind,
        llm_url = %config.llm_url,
        llm_model = %config.llm_model,
        "Configuration loaded"
    );

    // Built outside the runtime: the chat client is a blocking HTTP client.
    let core = Arc::new(core_state::CoreState::from_config(config)?);
    let bind = core.config().bind;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let mut server = api::start_server(core.clone(), bind).await?;
        tracing::info!(addr = %server.session.server_addr, "Listening");

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
        }
        server.shutdown();
        server.stopped().await;
        Ok::<(), RunError>(())
    })?;

    drop(runtime);
    tracing::info!(reports = core.store().len(), "Shutting down, stored reports discarded");
    Ok(())
}
