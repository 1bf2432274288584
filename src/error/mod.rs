use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::notification::{DispatchError, StoreError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(format!("Notification {} not found", id)),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::NotFound(id) => {
                AppError::NotFound(format!("Notification {} not found", id))
            }
            DispatchError::Provider { .. } | DispatchError::Interrupted { .. } => {
                AppError::Dispatch(err.to_string())
            }
            DispatchError::Store(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, client_message, log_message) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                msg.clone(),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
                msg.clone(),
            ),
            // The committed status is readable via GET /v1/requests/{id}
            AppError::Dispatch(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DISPATCH_FAILED",
                "Error processing notification".to_string(),
                msg.clone(),
            ),
            AppError::Internal(e) => {
                let log_msg = e.clone();
                let client_msg = if is_production() {
                    "Internal server error".to_string()
                } else {
                    log_msg.clone()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", client_msg, log_msg)
            }
        };

        // Always log the detailed error server-side
        tracing::error!(
            code = %code,
            status = %status.as_u16(),
            message = %log_message,
            "API error"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        let not_found = AppError::NotFound("x".into()).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = AppError::Validation("bad body".into()).into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let dispatch = AppError::Dispatch("provider down".into()).into_response();
        assert_eq!(dispatch.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_dispatch_error_mapping() {
        let id = Uuid::new_v4();
        let err: AppError = DispatchError::NotFound(id).into();
        assert!(matches!(err, AppError::NotFound(_)));

        let err: AppError = DispatchError::Provider {
            id,
            source: ProviderError::RateLimited,
        }
        .into();
        assert!(matches!(err, AppError::Dispatch(_)));

        let err: AppError = DispatchError::Interrupted {
            id,
            reason: "task panicked".into(),
        }
        .into();
        assert!(matches!(err, AppError::Dispatch(_)));
    }
}
