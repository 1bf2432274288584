use async_trait::async_trait;
use reqwest::StatusCode;

use super::{
    Delivery, NotifyResponse, ProviderClient, ProviderError, ProviderRequest, API_KEY_HEADER,
};

/// Provider client speaking the `POST /v1/notify` HTTP contract.
#[derive(Clone)]
pub struct HttpProviderClient {
    endpoint: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl HttpProviderClient {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, api_key: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            endpoint: format!("{}/v1/notify", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            http_client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    async fn send(&self, request: &ProviderRequest) -> Result<Delivery, ProviderError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::RemoteFailure(format!("transport error: {}", e)))?;

        match response.status() {
            StatusCode::OK => {
                let body: NotifyResponse = response.json().await.map_err(|e| {
                    ProviderError::RemoteFailure(format!("invalid provider response: {}", e))
                })?;
                Ok(Delivery {
                    provider_id: body.provider_id,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited),
            status => Err(ProviderError::RemoteFailure(format!(
                "provider responded with {}",
                status
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
