use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::api::{api_routes, provider_routes};

use super::{AppState, ProviderState};

/// Router for the dispatcher service
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.settings.server.body_limit_bytes;

    Router::new()
        .merge(api_routes())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}

/// Router for the provider simulator
pub fn create_provider_app(state: ProviderState) -> Router {
    Router::new()
        .merge(provider_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
