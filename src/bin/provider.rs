//! Provider simulator server: `POST /v1/notify` with injected latency,
//! random failures, a bounded admission gate and a sliding window rate limit.

use anyhow::Result;
use tokio::net::TcpListener;

use ara_dispatch_service::config::Settings;
use ara_dispatch_service::server::{create_provider_app, ProviderState};
use ara_dispatch_service::shutdown::shutdown_signal;
use ara_dispatch_service::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let mut settings = Settings::new()?;
    if settings.otel.service_name == "ara-dispatch-service" {
        settings.otel.service_name = "ara-provider-simulator".to_string();
    }

    let _telemetry = init_telemetry(&settings.otel)?;

    let sim = &settings.simulator;
    tracing::info!(
        max_concurrent = sim.max_concurrent,
        rate_limit_threshold = sim.rate_limit_threshold,
        rate_limit_window_secs = sim.rate_limit_window_secs,
        latency_min_ms = sim.latency_min_ms,
        latency_max_ms = sim.latency_max_ms,
        failure_rate = sim.failure_rate,
        "Provider simulator configured"
    );

    let app = create_provider_app(ProviderState::new(&settings));

    let addr = settings.simulator_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Provider simulator listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Provider simulator stopped");
    Ok(())
}
