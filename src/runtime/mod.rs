//! # Runtime
//!
//! Process-level plumbing around the reconciler.
//!
//! - `initialization`: tracing, metrics, HTTP server, Kubernetes client, CRD check
//! - `error_policy`: per-object backoff after failed passes
//! - `watch_loop`: the kube-runtime controller and its restart loop

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;
