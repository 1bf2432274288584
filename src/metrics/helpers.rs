//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use crate::notification::{Channel, NotificationStatus, StatusCounts};

use super::{
    DISPATCH_LATENCY, DISPATCH_TOTAL, NOTIFICATIONS_CREATED_TOTAL, NOTIFICATIONS_STATUS,
    PROVIDER_IN_FLIGHT, PROVIDER_REQUESTS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    into_text(buffer)
}

fn into_text(buffer: Vec<u8>) -> Result<String, prometheus::Error> {
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("metrics output is not valid UTF-8: {}", e)))
}

/// Helper struct for recording dispatcher metrics
pub struct DispatchMetrics;

impl DispatchMetrics {
    /// Record a notification created on `channel`
    pub fn record_created(channel: Channel) {
        NOTIFICATIONS_CREATED_TOTAL
            .with_label_values(&[channel.as_str()])
            .inc();
    }

    /// Record a process call outcome
    pub fn record_outcome(outcome: &str) {
        DISPATCH_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record the duration of one provider call
    pub fn observe_latency(elapsed: Duration) {
        DISPATCH_LATENCY.observe(elapsed.as_secs_f64());
    }

    /// Refresh the per-status gauges (call before encoding)
    pub fn update_status_counts(counts: &StatusCounts) {
        for status in NotificationStatus::ALL {
            NOTIFICATIONS_STATUS
                .with_label_values(&[status.as_str()])
                .set(counts.get(status) as i64);
        }
    }
}

/// Helper struct for recording provider simulator metrics
pub struct ProviderMetrics;

impl ProviderMetrics {
    /// Record a simulator response
    pub fn record_response(outcome: &str) {
        PROVIDER_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
    }

    pub fn set_in_flight(count: usize) {
        PROVIDER_IN_FLIGHT.set(count as i64);
    }
}
