//! # Observability
//!
//! Prometheus metrics for the operator. Logging is configured at startup in
//! [`crate::runtime::initialization`].

pub mod metrics;

pub use metrics::*;
