//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Composition and request dispatch produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (method, path, prefix)
//! - Metrics are cheap no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
