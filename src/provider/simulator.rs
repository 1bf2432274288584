//! Provider simulator: an unreliable remote notification service.
//!
//! Each request goes through, in order:
//! 1. credential check (no slot consumed on mismatch)
//! 2. admission gate, a semaphore bounding in-flight requests (callers wait)
//! 3. sliding window rate limit (explicit rejection, no latency charged)
//! 4. injected latency
//! 5. injected random failure

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::config::SimulatorConfig;
use crate::metrics::ProviderMetrics;
use crate::ratelimit::{RateLimiter, RateLimiterStats};

use super::ProviderRequest;

/// Outcome of a simulated provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatorResponse {
    Delivered { provider_id: String },
    Unauthorized,
    RateLimited,
    RemoteFailure,
}

impl SimulatorResponse {
    pub fn outcome(&self) -> &'static str {
        match self {
            SimulatorResponse::Delivered { .. } => "delivered",
            SimulatorResponse::Unauthorized => "unauthorized",
            SimulatorResponse::RateLimited => "rate_limited",
            SimulatorResponse::RemoteFailure => "remote_failure",
        }
    }
}

#[derive(Debug, Default)]
struct SimulatorCounters {
    delivered: AtomicU64,
    unauthorized: AtomicU64,
    rate_limited: AtomicU64,
    remote_failure: AtomicU64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Snapshot of simulator statistics
#[derive(Debug, Clone, Serialize)]
pub struct SimulatorStats {
    pub delivered: u64,
    pub unauthorized: u64,
    pub rate_limited: u64,
    pub remote_failure: u64,
    pub in_flight: usize,
    pub peak_in_flight: usize,
    pub max_concurrent: usize,
    pub rate_limit: RateLimiterStats,
}

/// Decrements the in-flight gauge on every exit path, including cancellation.
struct InFlightGuard<'a> {
    counters: &'a SimulatorCounters,
}

impl<'a> InFlightGuard<'a> {
    fn enter(counters: &'a SimulatorCounters) -> Self {
        let current = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        counters.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        ProviderMetrics::set_in_flight(current);
        Self { counters }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let current = self.counters.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        ProviderMetrics::set_in_flight(current);
    }
}

pub struct ProviderSimulator {
    api_key: String,
    gate: Semaphore,
    max_concurrent: usize,
    rate_limiter: RateLimiter,
    latency_min: Duration,
    latency_max: Duration,
    failure_rate: f64,
    counters: SimulatorCounters,
}

impl ProviderSimulator {
    pub fn new(config: &SimulatorConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            gate: Semaphore::new(config.max_concurrent),
            max_concurrent: config.max_concurrent,
            rate_limiter: RateLimiter::new(config.rate_limit_threshold, config.rate_limit_window()),
            latency_min: Duration::from_millis(config.latency_min_ms),
            latency_max: Duration::from_millis(config.latency_max_ms.max(config.latency_min_ms)),
            failure_rate: config.failure_rate.clamp(0.0, 1.0),
            counters: SimulatorCounters::default(),
        }
    }

    /// Handle one provider request presented with `credential`.
    ///
    /// The admission slot is released when this future completes or is dropped.
    #[tracing::instrument(
        name = "provider.handle",
        skip(self, request, credential),
        fields(channel = %request.channel, trace_id = ?request.trace_id)
    )]
    pub async fn handle(&self, request: &ProviderRequest, credential: Option<&str>) -> SimulatorResponse {
        let response = self.handle_inner(request, credential).await;
        self.count(&response);
        ProviderMetrics::record_response(response.outcome());
        response
    }

    async fn handle_inner(&self, request: &ProviderRequest, credential: Option<&str>) -> SimulatorResponse {
        if credential != Some(self.api_key.as_str()) {
            tracing::warn!("Invalid API key presented to provider");
            return SimulatorResponse::Unauthorized;
        }

        let _permit = match self.gate.acquire().await {
            Ok(permit) => permit,
            // The gate is never closed
            Err(_) => return SimulatorResponse::RemoteFailure,
        };
        let _in_flight = InFlightGuard::enter(&self.counters);

        if !self.rate_limiter.allow(Instant::now()) {
            tracing::debug!(
                in_window = self.rate_limiter.in_window(Instant::now()),
                "Provider rate limit exceeded"
            );
            return SimulatorResponse::RateLimited;
        }

        let latency = self.draw_latency();
        tokio::time::sleep(latency).await;

        if self.draw_failure() {
            tracing::debug!(latency_ms = latency.as_millis() as u64, "Injected provider failure");
            return SimulatorResponse::RemoteFailure;
        }

        let provider_id = format!("p-{}", Uuid::new_v4().simple());
        tracing::debug!(
            to = %request.to,
            provider_id = %provider_id,
            latency_ms = latency.as_millis() as u64,
            "Provider delivered notification"
        );
        SimulatorResponse::Delivered { provider_id }
    }

    fn draw_latency(&self) -> Duration {
        if self.latency_min == self.latency_max {
            return self.latency_min;
        }
        let millis = rand::rng()
            .random_range(self.latency_min.as_millis() as u64..=self.latency_max.as_millis() as u64);
        Duration::from_millis(millis)
    }

    fn draw_failure(&self) -> bool {
        rand::rng().random::<f64>() < self.failure_rate
    }

    fn count(&self, response: &SimulatorResponse) {
        let counter = match response {
            SimulatorResponse::Delivered { .. } => &self.counters.delivered,
            SimulatorResponse::Unauthorized => &self.counters.unauthorized,
            SimulatorResponse::RateLimited => &self.counters.rate_limited,
            SimulatorResponse::RemoteFailure => &self.counters.remote_failure,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Requests currently holding an admission slot
    pub fn in_flight(&self) -> usize {
        self.max_concurrent - self.gate.available_permits()
    }

    pub fn stats(&self) -> SimulatorStats {
        SimulatorStats {
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            unauthorized: self.counters.unauthorized.load(Ordering::Relaxed),
            rate_limited: self.counters.rate_limited.load(Ordering::Relaxed),
            remote_failure: self.counters.remote_failure.load(Ordering::Relaxed),
            in_flight: self.counters.in_flight.load(Ordering::Relaxed),
            peak_in_flight: self.counters.peak_in_flight.load(Ordering::Relaxed),
            max_concurrent: self.max_concurrent,
            rate_limit: self.rate_limiter.stats(),
        }
    }
}
