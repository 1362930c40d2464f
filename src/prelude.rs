//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use redis_operator::prelude::*;
//! ```

// CRD types
pub use crate::crd::*;

// Reconciler types
pub use crate::controller::reconciler::{
    reconcile, reconcile_object, BackoffState, ClusterStore, DeleteOutcome, FinalizerPhase,
    KubeStore, ObjectKey, ReconcileOutcome, Reconciler, ReconcilerError,
};

// Config types
pub use crate::config::{ControllerConfig, LogFormat};
