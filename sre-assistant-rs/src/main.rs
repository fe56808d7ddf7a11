// sre-assistant-rs/src/main.rs
// SRE assistant HTTP entry point

use std::sync::Arc;

use sre_assistant::{create_router, AppState};
use sre_sdk::EnvConfigProvider;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let loaded_env = config_rs::load_env();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if loaded_env {
        log::info!("Loaded settings from .env");
    }

    let provider = EnvConfigProvider::assistant();
    let shutdown = CancellationToken::new();
    let state = AppState::from_provider(&provider).with_shutdown_token(shutdown.clone());
    log::info!(
        "Request timeout: {}s",
        state.request_timeout.as_secs()
    );

    let app = create_router(Arc::new(state));

    let addr = config_rs::get_bind_address(config_rs::SERVICE_NAME, config_rs::DEFAULT_PORT);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!(
        "{} listening on {}",
        config_rs::get_formatted_service_name(config_rs::SERVICE_NAME),
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
                return;
            }
            log::info!("Shutdown requested, cancelling in-flight requests");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
