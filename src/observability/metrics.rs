//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_requests_total` (counter): inbound requests by method, status
//! - `bridge_request_duration_seconds` (histogram): inbound latency
//! - `bridge_submissions_total` (counter): submissions by outcome
//! - `bridge_callbacks_total` (counter): callbacks by outcome
//! - `bridge_chain_call_duration_seconds` (histogram): outbound latency by outcome
//!
//! Recording is a no-op until a recorder is installed, so tests and the
//! CLI never need to call [`init_metrics`].

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "bridge_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("bridge_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_submission(outcome: &'static str) {
    metrics::counter!("bridge_submissions_total", "outcome" => outcome).increment(1);
}

pub fn record_callback(outcome: &'static str) {
    metrics::counter!("bridge_callbacks_total", "outcome" => outcome).increment(1);
}

pub fn record_chain_call(outcome: &'static str, start: Instant) {
    metrics::histogram!("bridge_chain_call_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
