//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Breaker and guard produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (state gauges, decision counters, lookup latency)
//!
//! Consumers:
//!     → stdout log aggregation
//!     → Prometheus scrape (optional)
//! ```
//!
//! # Design Decisions
//! - Logging is best effort and never changes a decision
//! - Metrics are cheap and no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
