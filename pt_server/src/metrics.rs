//! Prometheus metrics for the tournament server.
//!
//! Exposed in Prometheus text format on the `METRICS_BIND` address for
//! scraping by monitoring systems.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus metrics exporter.
///
/// Metrics become available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))
}

/// Record a completed pool build.
pub fn pool_builds_total() {
    metrics::counter!("pool_builds_total").increment(1);
}

/// Record an aborted pool build, labeled by failure kind.
pub fn pool_build_failures_total(reason: &str) {
    metrics::counter!("pool_build_failures_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record how many teams the last build assigned.
pub fn teams_assigned_total(count: usize) {
    metrics::counter!("teams_assigned_total").increment(count as u64);
}

/// Record pool build duration in milliseconds.
pub fn pool_build_duration_ms(duration_ms: f64) {
    metrics::histogram!("pool_build_duration_ms").record(duration_ms);
}
