//! Prometheus metrics endpoint.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::metrics::{self, DispatchMetrics};
use crate::server::AppState;

/// GET /metrics on the dispatcher
pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    DispatchMetrics::update_status_counts(&state.store.status_counts());
    render()
}

/// GET /metrics on the provider simulator
pub async fn provider_metrics() -> impl IntoResponse {
    render()
}

fn render() -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    match metrics::encode_metrics() {
        Ok(output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode Prometheus metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
