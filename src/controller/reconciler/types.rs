//! # Types
//!
//! Core types for the reconciler.

use crate::config::ControllerConfig;
use crate::controller::backoff::FibonacciBackoff;
use crate::controller::reconciler::store::ClusterStore;
use kube::Resource;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    /// A call against the cluster store failed (network, timeout, conflict)
    #[error(transparent)]
    Store(#[from] anyhow::Error),
    /// The entropy source could not produce a password
    #[error("failed to generate credential: {0}")]
    CredentialGeneration(#[source] rand::Error),
    /// The `Redis` `spec` carries a value the quantity parser rejects
    #[error("invalid quantity for {field}: '{value}'")]
    InvalidQuantity { field: &'static str, value: String },
    /// The object handed to the reconciler has no name or namespace
    #[error("object is missing metadata.{0}")]
    MissingObjectKey(&'static str),
}

impl ReconcilerError {
    /// Errors that cannot succeed without a spec edit
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ReconcilerError::InvalidQuantity { .. } | ReconcilerError::MissingObjectKey(_)
        )
    }
}

/// Identity of a namespaced object
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Extract the identity of a namespaced resource
    ///
    /// # Errors
    ///
    /// Returns [`ReconcilerError::MissingObjectKey`] when name or namespace is unset.
    pub fn for_resource<K: Resource>(resource: &K) -> Result<Self, ReconcilerError> {
        let meta = resource.meta();
        let name = meta
            .name
            .clone()
            .ok_or(ReconcilerError::MissingObjectKey("name"))?;
        let namespace = meta
            .namespace
            .clone()
            .ok_or(ReconcilerError::MissingObjectKey("namespace"))?;
        Ok(Self { namespace, name })
    }

    /// Key of another object in the same namespace
    #[must_use]
    pub fn sibling(&self, name: impl Into<String>) -> Self {
        Self::new(self.namespace.clone(), name)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Result of a successful pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Converged; wait for the next change
    Done,
    /// Invoke another pass soon; the current one did not fail
    Requeue,
    /// The object is gone or no longer carries our finalizer
    Released,
}

impl ReconcileOutcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::Done => "done",
            ReconcileOutcome::Requeue => "requeue",
            ReconcileOutcome::Released => "released",
        }
    }
}

/// Backoff state for a specific resource
/// Tracks error count and backoff calculator for progressive retries
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            backoff: FibonacciBackoff::new(min_secs, max_secs),
            error_count: 0,
        }
    }

    pub fn increment_error(&mut self) {
        self.error_count += 1;
    }

    pub fn reset(&mut self) {
        self.error_count = 0;
        self.backoff.reset();
    }
}

/// Shared context handed to every reconciliation
pub struct Reconciler {
    pub store: Arc<dyn ClusterStore>,
    pub config: ControllerConfig,
    // Backoff state per resource (identified by namespace/name)
    // Owned by the error policy; the reconcile pass itself never reads it
    pub backoff_states: Arc<Mutex<HashMap<String, BackoffState>>>,
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(store: Arc<dyn ClusterStore>, config: ControllerConfig) -> Self {
        Self {
            store,
            config,
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Forget the error history of a resource after a successful pass
    ///
    /// Returns true when the resource was backing off.
    pub fn reset_backoff(&self, key: &ObjectKey) -> bool {
        let Ok(mut states) = self.backoff_states.lock() else {
            return false;
        };
        states.get_mut(&key.to_string()).is_some_and(|state| {
            let had_errors = state.error_count > 0;
            state.reset();
            had_errors
        })
    }

    /// Drop the backoff entry of a resource that will not be reconciled again
    ///
    /// Returns true when an entry was removed.
    pub fn forget_backoff(&self, key: &ObjectKey) -> bool {
        self.backoff_states
            .lock()
            .is_ok_and(|mut states| states.remove(&key.to_string()).is_some())
    }

    /// Record a failed pass and return the delay before the next attempt
    pub fn next_backoff(&self, key: &ObjectKey) -> Option<(u64, u32)> {
        let mut states = self.backoff_states.lock().ok()?;
        let state = states.entry(key.to_string()).or_insert_with(|| {
            BackoffState::new(self.config.backoff_min_secs, self.config.backoff_max_secs)
        });
        state.increment_error();
        Some((state.backoff.next_backoff_seconds(), state.error_count))
    }
}
