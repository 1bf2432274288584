//! Dispatcher endpoints: create, process and read notification requests.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::notification::{Channel, NotificationStatus, ProcessOutcome};
use crate::server::AppState;

/// Body of `POST /v1/requests`
#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    pub to: String,
    pub message: String,
    #[serde(rename = "type")]
    pub channel: Channel,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: Uuid,
    pub status: NotificationStatus,
}

/// Register a notification; it starts out `queued`
#[tracing::instrument(name = "http.create_request", skip(state, payload))]
pub async fn create_request(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let Json(request) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    if request.to.trim().is_empty() {
        return Err(AppError::Validation("`to` must not be empty".to_string()));
    }
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("`message` must not be empty".to_string()));
    }

    let id = state
        .store
        .create(request.to, request.message, request.channel);

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Dispatch a notification to the provider
#[tracing::instrument(name = "http.process_request", skip(state))]
pub async fn process_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProcessResponse>> {
    let id = parse_id(&id)?;

    match state.dispatcher.process(id).await? {
        ProcessOutcome::Dispatched(delivery) => {
            tracing::debug!(notification_id = %id, provider_id = %delivery.provider_id, "Processed");
        }
        ProcessOutcome::AlreadyHandled(status) => {
            tracing::debug!(notification_id = %id, status = %status, "Already processed");
        }
    }

    Ok(Json(ProcessResponse {
        message: "Notification processing finished".to_string(),
    }))
}

/// Read the current status of a notification
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>> {
    let id = parse_id(&id)?;
    let notification = state.store.get(&id)?;

    Ok(Json(StatusResponse {
        id: notification.id,
        status: notification.status,
    }))
}

// Ids that are not UUIDs cannot name a stored notification
fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Notification {} not found", raw)))
}
