//! Metrics collection and exposition.
//!
//! # Metrics
//! - `stream_requests_total` (counter): requests by HTTP status and stream outcome
//! - `stream_request_duration_seconds` (histogram): time from arrival to finish
//! - `stream_active` (gauge): streams currently being handled
//!
//! Recording is a no-op until a recorder is installed, so tests and
//! deployments without the exporter pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// How a request ended, from the stream's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Rejected before acceptance.
    Rejected,
    /// Finished with the success status.
    Success,
    /// Finished with an error status.
    Error,
    /// The terminal status could not be written.
    Aborted,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Rejected => "rejected",
            Outcome::Success => "success",
            Outcome::Error => "error",
            Outcome::Aborted => "aborted",
        }
    }
}

/// Start the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(status: u16, outcome: Outcome, start: Instant) {
    let labels = [
        ("status", status.to_string()),
        ("outcome", outcome.as_str().to_string()),
    ];
    metrics::counter!("stream_requests_total", &labels).increment(1);
    metrics::histogram!("stream_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Track a stream entering or leaving the active set.
pub fn stream_started() {
    metrics::gauge!("stream_active").increment(1.0);
}

pub fn stream_ended() {
    metrics::gauge!("stream_active").decrement(1.0);
}
