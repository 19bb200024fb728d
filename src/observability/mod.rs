//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers, orchestrator, receiver, chain client produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Secrets are never logged

pub mod logging;
pub mod metrics;
