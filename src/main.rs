use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;

use ara_dispatch_service::config::Settings;
use ara_dispatch_service::notification::FileEventLog;
use ara_dispatch_service::provider::create_provider_client;
use ara_dispatch_service::server::{create_app, AppState};
use ara_dispatch_service::shutdown::shutdown_signal;
use ara_dispatch_service::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    let _telemetry = init_telemetry(&settings.otel)?;
    tracing::info!("Configuration loaded");

    let provider = create_provider_client(&settings);

    // Optional write-behind event log
    let (state, event_log_handle) = if settings.event_log.enabled {
        let (log, handle) = FileEventLog::spawn(&settings.event_log.path, settings.event_log.capacity);
        let state = AppState::with_sink(settings.clone(), provider, Arc::new(log));
        (state, Some(handle))
    } else {
        (AppState::new(settings.clone(), provider), None)
    };
    tracing::info!("Application state initialized");

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Dispatcher listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and with it the last event log handle) is gone; let the writer drain
    if let Some(handle) = event_log_handle {
        tracing::info!("Waiting for event log to flush...");
        let _ = handle.await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}
