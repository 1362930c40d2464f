//! # Reconciler
//!
//! Core reconciliation logic for `Redis` resources.
//!
//! The reconciler:
//! - Guards every `Redis` with a finalizer and cleans up dependents on deletion
//! - Creates the `<name>-secret` credential Secret once
//! - Creates the Deployment and keeps its tracked fields equal to the `Redis` `spec`
//! - Mirrors the Deployment status onto the `Redis` status
//!
//! The cluster is reached only through [`ClusterStore`], so the whole pass can
//! run against an in-memory store.

pub mod credential;
pub mod drift;
pub mod finalizer;
pub mod quantity;
pub mod reconcile;
pub mod status;
pub mod store;
pub mod types;
pub mod workload;

// Re-export public API
pub use drift::{correct_drift, detect_drift, DriftCategory, WorkloadShape};
pub use finalizer::{drive_finalizer, has_finalizer, phase_of, FinalizerPhase};
pub use reconcile::{reconcile, reconcile_object};
pub use status::{project_status, sync_status};
pub use store::{ClusterStore, DeleteOutcome, KubeStore};
pub use types::{BackoffState, ObjectKey, ReconcileOutcome, Reconciler, ReconcilerError};
pub use workload::build_deployment;
