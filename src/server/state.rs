use std::sync::Arc;

use crate::config::Settings;
use crate::notification::{DispatchProcessor, EventSink, NotificationStore};
use crate::provider::{ProviderClient, ProviderSimulator};

/// State shared by the dispatcher routes
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<NotificationStore>,
    pub dispatcher: Arc<DispatchProcessor>,
}

impl AppState {
    pub fn new(settings: Settings, provider: Arc<dyn ProviderClient>) -> Self {
        Self::with_store(settings, Arc::new(NotificationStore::new()), provider)
    }

    /// Build state whose store reports committed changes to `sink`
    pub fn with_sink(
        settings: Settings,
        provider: Arc<dyn ProviderClient>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self::with_store(settings, Arc::new(NotificationStore::with_sink(sink)), provider)
    }

    pub fn with_store(
        settings: Settings,
        store: Arc<NotificationStore>,
        provider: Arc<dyn ProviderClient>,
    ) -> Self {
        let dispatcher = Arc::new(DispatchProcessor::new(
            store.clone(),
            provider,
            settings.dispatch.timeout(),
        ));

        Self {
            settings: Arc::new(settings),
            store,
            dispatcher,
        }
    }
}

/// State shared by the provider simulator routes
#[derive(Clone)]
pub struct ProviderState {
    pub simulator: Arc<ProviderSimulator>,
}

impl ProviderState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            simulator: Arc::new(ProviderSimulator::new(&settings.simulator)),
        }
    }
}
