use axum::{
    routing::{get, post},
    Router,
};

use crate::server::{AppState, ProviderState};

use super::health::{health, provider_stats, stats};
use super::metrics::{prometheus_metrics, provider_metrics};
use super::notify::notify;
use super::requests::{create_request, get_request, process_request};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & Stats
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(prometheus_metrics))
        // Notification requests
        .nest(
            "/v1",
            Router::new()
                .route("/requests", post(create_request))
                .route("/requests/{id}", get(get_request))
                .route("/requests/{id}/process", post(process_request)),
        )
}

pub fn provider_routes() -> Router<ProviderState> {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(provider_stats))
        .route("/metrics", get(provider_metrics))
        .route("/v1/notify", post(notify))
}
