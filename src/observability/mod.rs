//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Controller and streams produce:
//!     → logging.rs (structured log events, per-request spans)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
