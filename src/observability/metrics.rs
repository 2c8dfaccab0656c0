//! Metrics collection and exposition.
//!
//! # Metrics
//! - `session_guard_breaker_state` (gauge): 0=closed, 1=open, 2=half-open, by breaker
//! - `session_guard_breaker_rejections_total` (counter): calls refused while open, by breaker
//! - `session_guard_decisions_total` (counter): revocation decisions, by reason
//! - `session_guard_lookup_duration_seconds` (histogram): store lookup latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exposition is opt-in via config

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::CircuitState;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_breaker_state(breaker: &str, state: CircuitState) {
    ::metrics::gauge!("session_guard_breaker_state", "breaker" => breaker.to_string())
        .set(state as u8 as f64);
}

pub fn record_breaker_rejection(breaker: &str) {
    ::metrics::counter!("session_guard_breaker_rejections_total", "breaker" => breaker.to_string())
        .increment(1);
}

pub fn record_decision(reason: &'static str) {
    ::metrics::counter!("session_guard_decisions_total", "reason" => reason).increment(1);
}

pub fn record_lookup_duration(elapsed: Duration) {
    ::metrics::histogram!("session_guard_lookup_duration_seconds").record(elapsed.as_secs_f64());
}
