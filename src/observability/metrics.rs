//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rewrite_requests_total` (counter): requests by rule, outcome and status
//! - `rewrite_request_duration_seconds` (histogram): latency by outcome
//! - `rewrite_upstream_errors_total` (counter): forwarding failures by kind
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// How a request left the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rewritten,
    Passthrough,
    NotFound,
    Rejected,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Rewritten => "rewritten",
            Outcome::Passthrough => "passthrough",
            Outcome::NotFound => "not_found",
            Outcome::Rejected => "rejected",
        }
    }
}

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(rule: &str, outcome: Outcome, status: u16, start: Instant) {
    ::metrics::counter!(
        "rewrite_requests_total",
        "rule" => rule.to_string(),
        "outcome" => outcome.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "rewrite_request_duration_seconds",
        "outcome" => outcome.as_str()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_error(kind: &'static str) {
    ::metrics::counter!("rewrite_upstream_errors_total", "kind" => kind).increment(1);
}
