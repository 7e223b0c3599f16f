//! Metrics collection and exposition.
//!
//! # Metrics
//! - `schema_proxy_requests_total` (counter): requests by method, status, outcome
//! - `schema_proxy_request_duration_seconds` (histogram): latency by method, outcome
//! - `schema_proxy_schema_compilations_total` (counter): compilations by result
//!
//! Recording without an installed exporter is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished request.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "schema_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    metrics::histogram!(
        "schema_proxy_request_duration_seconds",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one schema compilation attempt.
pub fn record_compilation(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("schema_proxy_schema_compilations_total", "result" => result).increment(1);
}
