use std::sync::Arc;

use async_trait::async_trait;

use super::{Delivery, ProviderClient, ProviderError, ProviderRequest, ProviderSimulator, SimulatorResponse};

/// Provider client calling an in-process simulator.
///
/// Dropping the `send` future (e.g. on a dispatcher timeout) drops the
/// simulator call with it, which releases its admission slot.
pub struct LocalProviderClient {
    simulator: Arc<ProviderSimulator>,
    api_key: String,
}

impl LocalProviderClient {
    pub fn new(simulator: Arc<ProviderSimulator>, api_key: impl Into<String>) -> Self {
        Self {
            simulator,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ProviderClient for LocalProviderClient {
    async fn send(&self, request: &ProviderRequest) -> Result<Delivery, ProviderError> {
        match self.simulator.handle(request, Some(&self.api_key)).await {
            SimulatorResponse::Delivered { provider_id } => Ok(Delivery { provider_id }),
            SimulatorResponse::Unauthorized => Err(ProviderError::Unauthorized),
            SimulatorResponse::RateLimited => Err(ProviderError::RateLimited),
            SimulatorResponse::RemoteFailure => {
                Err(ProviderError::RemoteFailure("External server error".to_string()))
            }
        }
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::notification::{Channel, Notification};

    fn simulator(failure_rate: f64) -> Arc<ProviderSimulator> {
        Arc::new(ProviderSimulator::new(&SimulatorConfig {
            api_key: "secret".to_string(),
            latency_min_ms: 0,
            latency_max_ms: 0,
            failure_rate,
            ..Default::default()
        }))
    }

    fn request() -> ProviderRequest {
        ProviderRequest::from_notification(&Notification::new("a@b.com", "hi", Channel::Email))
    }

    #[tokio::test]
    async fn test_maps_simulator_outcomes() {
        let ok = LocalProviderClient::new(simulator(0.0), "secret");
        assert!(ok.send(&request()).await.is_ok());

        let failing = LocalProviderClient::new(simulator(1.0), "secret");
        assert!(matches!(
            failing.send(&request()).await,
            Err(ProviderError::RemoteFailure(_))
        ));

        let wrong_key = LocalProviderClient::new(simulator(0.0), "nope");
        assert_eq!(wrong_key.send(&request()).await, Err(ProviderError::Unauthorized));
    }
}
