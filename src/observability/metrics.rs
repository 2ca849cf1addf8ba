//! Metrics collection and exposition.
//!
//! # Metrics
//! - `apirouter_requests_total` (counter): requests by method, status, route
//! - `apirouter_request_duration_seconds` (histogram): latency by route
//! - `apirouter_unhandled_errors_total` (counter): errors no handler translated
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - `route` is the matched path pattern, never the raw path (bounded cardinality)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "apirouter_requests_total";
pub const REQUEST_DURATION: &str = "apirouter_request_duration_seconds";
pub const UNHANDLED_ERRORS: &str = "apirouter_unhandled_errors_total";

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    ::metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    ::metrics::histogram!(REQUEST_DURATION, "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_unhandled(route: &str) {
    ::metrics::counter!(UNHANDLED_ERRORS, "route" => route.to_string()).increment(1);
}
