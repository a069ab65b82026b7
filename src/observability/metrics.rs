//! Metrics collection and exposition.
//!
//! # Metrics
//! - `route_factory_requests_total` (counter): requests by method, route, status
//! - `route_factory_request_duration_seconds` (histogram): action latency
//! - `route_factory_routes_registered` (gauge): routes attached at startup

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(
            address = %addr,
            error = %e,
            "Failed to install metrics exporter"
        ),
    }
}

/// Record one dispatched request. `route` is the registered pattern.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("route_factory_requests_total", &labels).increment(1);
    histogram!("route_factory_request_duration_seconds", &labels[..2])
        .record(start.elapsed().as_secs_f64());
}

pub fn record_composed(count: usize) {
    gauge!("route_factory_routes_registered").set(count as f64);
}
