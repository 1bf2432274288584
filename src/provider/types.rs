use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notification::{Channel, Notification};

/// Header carrying the shared provider credential
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Delivery priority accepted by the provider (not used for scheduling)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// Body of `POST /v1/notify`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRequest {
    pub to: String,
    pub message: String,
    #[serde(rename = "type")]
    pub channel: Channel,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ProviderRequest {
    /// Outbound request for a stored notification, traced by its id
    pub fn from_notification(notification: &Notification) -> Self {
        Self {
            to: notification.recipient.clone(),
            message: notification.message.clone(),
            channel: notification.channel,
            priority: Priority::Normal,
            trace_id: Some(notification.id.to_string()),
        }
    }
}

/// Successful `POST /v1/notify` response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyResponse {
    pub status: String,
    pub provider_id: String,
}

/// Error response body of the provider surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderErrorBody {
    pub error: String,
}

/// Delivery confirmed by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub provider_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider rejected the credential")]
    Unauthorized,

    #[error("provider rate limit exceeded")]
    RateLimited,

    /// Injected failure, non-success response, transport error or timeout
    #[error("provider failure: {0}")]
    RemoteFailure(String),
}

impl ProviderError {
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Unauthorized => "unauthorized",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::RemoteFailure(_) => "remote_failure",
        }
    }
}

/// Capability the dispatcher uses to hand a notification to the provider.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Send one notification; resolves once the provider answered.
    async fn send(&self, request: &ProviderRequest) -> Result<Delivery, ProviderError>;

    /// Get the client name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_notification() {
        let notification = Notification::new("+34600000000", "code 1234", Channel::Sms);
        let request = ProviderRequest::from_notification(&notification);

        assert_eq!(request.to, "+34600000000");
        assert_eq!(request.channel, Channel::Sms);
        assert_eq!(request.trace_id, Some(notification.id.to_string()));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "sms");
        assert_eq!(json["priority"], "normal");
    }

    #[test]
    fn test_optional_fields_default() {
        let request: ProviderRequest =
            serde_json::from_str(r#"{"to":"a@b.com","message":"hi","type":"email"}"#).unwrap();
        assert_eq!(request.priority, Priority::Normal);
        assert!(request.trace_id.is_none());
    }
}
