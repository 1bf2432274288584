//! Provider simulator endpoint: `POST /v1/notify`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::provider::{
    NotifyResponse, ProviderErrorBody, ProviderRequest, SimulatorResponse, API_KEY_HEADER,
};
use crate::server::ProviderState;

pub async fn notify(
    State(state): State<ProviderState>,
    headers: HeaderMap,
    payload: Result<Json<ProviderRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return error_response(rejection.status(), rejection.body_text()),
    };

    let credential = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());

    tracing::debug!(
        to = %request.to,
        channel = %request.channel,
        priority = ?request.priority,
        trace_id = ?request.trace_id,
        "Provider request received"
    );

    match state.simulator.handle(&request, credential).await {
        SimulatorResponse::Delivered { provider_id } => (
            StatusCode::OK,
            Json(NotifyResponse {
                status: "delivered".to_string(),
                provider_id,
            }),
        )
            .into_response(),
        SimulatorResponse::Unauthorized => error_response(StatusCode::UNAUTHORIZED, "Invalid API Key"),
        SimulatorResponse::RateLimited => {
            error_response(StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded")
        }
        SimulatorResponse::RemoteFailure => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "External server error")
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ProviderErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}
