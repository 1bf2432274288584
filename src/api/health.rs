use axum::{extract::State, Json};
use serde::Serialize;

use crate::notification::{DispatcherStatsSnapshot, StatusCounts};
use crate::provider::SimulatorStats;
use crate::server::{AppState, ProviderState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub notifications: NotificationStats,
    pub dispatcher: DispatcherStatsSnapshot,
}

#[derive(Debug, Serialize)]
pub struct NotificationStats {
    pub total: usize,
    pub by_status: StatusCounts,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let by_status = state.store.status_counts();

    Json(StatsResponse {
        notifications: NotificationStats {
            total: state.store.len(),
            by_status,
        },
        dispatcher: state.dispatcher.stats(),
    })
}

pub async fn provider_stats(State(state): State<ProviderState>) -> Json<SimulatorStats> {
    Json(state.simulator.stats())
}
