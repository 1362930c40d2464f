//! # Controller
//!
//! Core controller modules for the Redis operator.
//!
//! - `backoff`: Fibonacci backoff for failed reconciliations
//! - `reconciler`: Core reconciliation logic
//! - `server`: HTTP server for metrics and health checks
//!
//! The `crdgen` binary lives next to these modules in `crdgen.rs`.

pub mod backoff;
pub mod reconciler;
pub mod server;
