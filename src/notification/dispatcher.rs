use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::metrics::DispatchMetrics;
use crate::provider::{Delivery, ProviderClient, ProviderError, ProviderRequest};

use super::{NotificationStatus, NotificationStore, StoreError};

/// Result of a `process` call that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The notification was not queued; nothing was dispatched.
    /// Carries the status observed at that moment.
    AlreadyHandled(NotificationStatus),
    /// This call dispatched the notification and the provider confirmed it
    Dispatched(Delivery),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("notification {0} not found")]
    NotFound(Uuid),

    /// The record was committed as `failed` before this error was returned
    #[error("dispatch of notification {id} failed: {source}")]
    Provider {
        id: Uuid,
        #[source]
        source: ProviderError,
    },

    /// The dispatch task panicked; the record was committed as `failed`
    #[error("dispatch of notification {id} was interrupted: {reason}")]
    Interrupted { id: Uuid, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Statistics for the dispatch processor
#[derive(Debug, Default)]
pub struct DispatcherStats {
    /// Dispatch attempts started (queued -> processing won)
    pub dispatched: AtomicU64,
    /// Attempts committed as sent
    pub sent: AtomicU64,
    /// Attempts committed as failed
    pub failed: AtomicU64,
    /// Calls that found the notification already taken
    pub skipped: AtomicU64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatcher statistics
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherStatsSnapshot {
    pub dispatched: u64,
    pub sent: u64,
    pub failed: u64,
    pub skipped: u64,
}

/// Drives notifications through `queued -> processing -> sent | failed`.
pub struct DispatchProcessor {
    store: Arc<NotificationStore>,
    provider: Arc<dyn ProviderClient>,
    timeout: Duration,
    stats: Arc<DispatcherStats>,
}

impl DispatchProcessor {
    /// Create a processor whose provider calls are bounded by `timeout`
    pub fn new(store: Arc<NotificationStore>, provider: Arc<dyn ProviderClient>, timeout: Duration) -> Self {
        Self {
            store,
            provider,
            timeout,
            stats: Arc::new(DispatcherStats::default()),
        }
    }

    /// Get dispatcher statistics
    pub fn stats(&self) -> DispatcherStatsSnapshot {
        self.stats.snapshot()
    }

    /// Dispatch a queued notification.
    ///
    /// Only the caller that moves the record from `queued` to `processing`
    /// talks to the provider; every other call returns `AlreadyHandled`.
    /// Provider rejections, transport errors and timeouts commit `failed`
    /// before the error is returned.
    ///
    /// The provider call and the final commit run on a spawned task, so
    /// dropping this future after the claim still ends in `sent` or `failed`.
    #[tracing::instrument(
        name = "dispatcher.process",
        skip(self),
        fields(provider = self.provider.name())
    )]
    pub async fn process(&self, id: Uuid) -> Result<ProcessOutcome, DispatchError> {
        let notification = self.store.get(&id).map_err(|e| match e {
            StoreError::NotFound(id) => DispatchError::NotFound(id),
            other => DispatchError::Store(other),
        })?;

        match self
            .store
            .transition(&id, NotificationStatus::Queued, NotificationStatus::Processing)
        {
            Ok(_) => {}
            Err(StoreError::InvalidTransition { current, .. }) => {
                self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                DispatchMetrics::record_outcome("skipped");
                tracing::debug!(
                    notification_id = %id,
                    status = %current,
                    "Notification already taken, skipping dispatch"
                );
                return Ok(ProcessOutcome::AlreadyHandled(current));
            }
            Err(StoreError::NotFound(id)) => return Err(DispatchError::NotFound(id)),
        }
        self.stats.dispatched.fetch_add(1, Ordering::Relaxed);

        let request = ProviderRequest::from_notification(&notification);
        let store = self.store.clone();
        let provider = self.provider.clone();
        let stats = self.stats.clone();
        let timeout = self.timeout;

        // Once claimed, the record is finished even if the caller goes away.
        let task = tokio::spawn(
            async move { complete(&store, provider.as_ref(), &stats, id, request, timeout).await }
                .in_current_span(),
        );

        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(notification_id = %id, error = %e, "Dispatch task aborted");
                if self
                    .store
                    .transition(&id, NotificationStatus::Processing, NotificationStatus::Failed)
                    .is_ok()
                {
                    self.stats.failed.fetch_add(1, Ordering::Relaxed);
                    DispatchMetrics::record_outcome("failed");
                }
                Err(DispatchError::Interrupted {
                    id,
                    reason: e.to_string(),
                })
            }
        }
    }
}

/// Call the provider for a claimed notification and commit `sent` or `failed`.
async fn complete(
    store: &NotificationStore,
    provider: &dyn ProviderClient,
    stats: &DispatcherStats,
    id: Uuid,
    request: ProviderRequest,
    timeout: Duration,
) -> Result<ProcessOutcome, DispatchError> {
    let started = Instant::now();
    let result = match tokio::time::timeout(timeout, provider.send(&request)).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::RemoteFailure(format!(
            "provider call timed out after {}ms",
            timeout.as_millis()
        ))),
    };
    DispatchMetrics::observe_latency(started.elapsed());

    match result {
        Ok(delivery) => {
            store.transition(&id, NotificationStatus::Processing, NotificationStatus::Sent)?;
            stats.sent.fetch_add(1, Ordering::Relaxed);
            DispatchMetrics::record_outcome("sent");
            tracing::info!(
                notification_id = %id,
                provider_id = %delivery.provider_id,
                "Notification sent"
            );
            Ok(ProcessOutcome::Dispatched(delivery))
        }
        Err(error) => {
            store.transition(&id, NotificationStatus::Processing, NotificationStatus::Failed)?;
            stats.failed.fetch_add(1, Ordering::Relaxed);
            DispatchMetrics::record_outcome("failed");
            tracing::warn!(
                notification_id = %id,
                reason = error.kind(),
                error = %error,
                "Notification dispatch failed"
            );
            Err(DispatchError::Provider { id, source: error })
        }
    }
}
