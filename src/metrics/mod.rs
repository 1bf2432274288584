//! Prometheus metrics for the dispatch service and the provider simulator.
//!
//! - Notification metrics (created per channel, current status counts)
//! - Dispatch metrics (outcomes, provider call latency)
//! - Provider metrics (responses by outcome, in-flight requests)

mod helpers;

pub use helpers::{encode_metrics, DispatchMetrics, ProviderMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, register_int_gauge_vec,
    Histogram, IntCounterVec, IntGauge, IntGaugeVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "ara";

lazy_static! {
    // ============================================================================
    // Notification Metrics
    // ============================================================================

    /// Notifications created by channel
    pub static ref NOTIFICATIONS_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_notifications_created_total", METRIC_PREFIX),
        "Total notifications created",
        &["channel"]
    ).unwrap();

    /// Notifications currently in each status
    pub static ref NOTIFICATIONS_STATUS: IntGaugeVec = register_int_gauge_vec!(
        format!("{}_notifications_status", METRIC_PREFIX),
        "Number of notifications per status",
        &["status"]
    ).unwrap();

    // ============================================================================
    // Dispatch Metrics
    // ============================================================================

    /// Process calls by outcome (sent, failed, skipped)
    pub static ref DISPATCH_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_dispatch_total", METRIC_PREFIX),
        "Total process calls by outcome",
        &["outcome"]
    ).unwrap();

    /// Provider call latency as seen by the dispatcher
    pub static ref DISPATCH_LATENCY: Histogram = register_histogram!(
        format!("{}_dispatch_latency_seconds", METRIC_PREFIX),
        "Provider call latency in seconds",
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    // ============================================================================
    // Provider Metrics
    // ============================================================================

    /// Simulator responses by outcome
    pub static ref PROVIDER_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_provider_requests_total", METRIC_PREFIX),
        "Total provider requests by outcome",
        &["outcome"]
    ).unwrap();

    /// Requests holding an admission slot
    pub static ref PROVIDER_IN_FLIGHT: IntGauge = register_int_gauge!(
        format!("{}_provider_in_flight", METRIC_PREFIX),
        "Provider requests currently admitted"
    ).unwrap();
}
