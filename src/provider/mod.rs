//! Provider side of the dispatch pipeline.
//!
//! The dispatcher only knows the `ProviderClient` trait. Two clients exist:
//!
//! - `HttpProviderClient`: posts to a provider server (`POST /v1/notify`)
//! - `LocalProviderClient`: calls an in-process `ProviderSimulator`
//!
//! Use `create_provider_client()` to build the client selected by configuration.

mod http_client;
mod local;
mod simulator;
mod types;

use std::sync::Arc;

use crate::config::{ProviderMode, Settings};

pub use http_client::HttpProviderClient;
pub use local::LocalProviderClient;
pub use simulator::{ProviderSimulator, SimulatorResponse, SimulatorStats};
pub use types::{
    Delivery, NotifyResponse, Priority, ProviderClient, ProviderError, ProviderErrorBody,
    ProviderRequest, API_KEY_HEADER,
};

/// Create the provider client selected by `settings.provider.mode`.
///
/// In `local` mode the simulator is built from `settings.simulator` and runs
/// inside the dispatcher process.
pub fn create_provider_client(settings: &Settings) -> Arc<dyn ProviderClient> {
    match settings.provider.mode {
        ProviderMode::Http => {
            tracing::info!(
                mode = "http",
                base_url = %settings.provider.base_url,
                "Creating HTTP provider client"
            );
            Arc::new(HttpProviderClient::new(
                &settings.provider.base_url,
                settings.provider.api_key.clone(),
            ))
        }
        ProviderMode::Local => {
            tracing::info!(
                mode = "local",
                max_concurrent = settings.simulator.max_concurrent,
                rate_limit_threshold = settings.simulator.rate_limit_threshold,
                "Creating in-process provider simulator"
            );
            let simulator = Arc::new(ProviderSimulator::new(&settings.simulator));
            Arc::new(LocalProviderClient::new(
                simulator,
                settings.provider.api_key.clone(),
            ))
        }
    }
}
