//! # Finalizer Handling
//!
//! The `Redis` finalizer defers physical deletion until the dependent Secret
//! and Deployment are gone.
//!
//! ```text
//! Live ──(deletion requested)──► TerminatingWithFinalizer ──(cleanup ok)──► TerminatingClean
//!  │                                   │
//!  └─ marker added if absent           └─ cleanup error: marker kept, error returned
//! ```

use crate::constants::REDIS_FINALIZER;
use crate::controller::reconciler::store::{ClusterStore, DeleteOutcome};
use crate::controller::reconciler::types::{ObjectKey, ReconcilerError};
use crate::crd::Redis;
use crate::observability;
use tracing::{debug, info};

/// Lifecycle position of a `Redis` with respect to its finalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizerPhase {
    Live,
    TerminatingWithFinalizer,
    TerminatingClean,
}

impl FinalizerPhase {
    #[must_use]
    pub fn is_terminating(&self) -> bool {
        !matches!(self, FinalizerPhase::Live)
    }
}

#[must_use]
pub fn has_finalizer(redis: &Redis) -> bool {
    redis
        .metadata
        .finalizers
        .as_ref()
        .is_some_and(|finalizers| finalizers.iter().any(|f| f == REDIS_FINALIZER))
}

#[must_use]
pub fn phase_of(redis: &Redis) -> FinalizerPhase {
    match (redis.metadata.deletion_timestamp.is_some(), has_finalizer(redis)) {
        (false, _) => FinalizerPhase::Live,
        (true, true) => FinalizerPhase::TerminatingWithFinalizer,
        (true, false) => FinalizerPhase::TerminatingClean,
    }
}

/// Advance the finalizer protocol by one step
///
/// Returns the phase the object is in after this step together with the
/// latest copy of the object.
///
/// # Errors
///
/// Returns [`ReconcilerError::Store`] when persisting the object or deleting a
/// dependent fails. A terminating object keeps its marker in that case.
pub async fn drive_finalizer(
    store: &dyn ClusterStore,
    mut redis: Redis,
    key: &ObjectKey,
) -> Result<(FinalizerPhase, Redis), ReconcilerError> {
    match phase_of(&redis) {
        FinalizerPhase::Live => {
            if has_finalizer(&redis) {
                return Ok((FinalizerPhase::Live, redis));
            }
            redis
                .metadata
                .finalizers
                .get_or_insert_with(Vec::new)
                .push(REDIS_FINALIZER.to_string());
            let updated = store.update_redis(&redis).await?;
            debug!(
                resource.name = %key.name,
                resource.namespace = %key.namespace,
                "Added finalizer"
            );
            Ok((FinalizerPhase::Live, updated))
        }
        FinalizerPhase::TerminatingWithFinalizer => {
            cleanup_dependents(store, &redis, key).await?;

            if let Some(finalizers) = redis.metadata.finalizers.as_mut() {
                finalizers.retain(|f| f != REDIS_FINALIZER);
            }
            let updated = store.update_redis(&redis).await?;
            observability::metrics::increment_cleanups();
            info!(
                resource.name = %key.name,
                resource.namespace = %key.namespace,
                "Cleanup complete, removed finalizer"
            );
            Ok((FinalizerPhase::TerminatingClean, updated))
        }
        FinalizerPhase::TerminatingClean => Ok((FinalizerPhase::TerminatingClean, redis)),
    }
}

/// Delete the configured Secret (if any) and the Deployment
async fn cleanup_dependents(
    store: &dyn ClusterStore,
    redis: &Redis,
    key: &ObjectKey,
) -> Result<(), ReconcilerError> {
    if let Some(secret_name) = redis.spec.cleanup_secret_name() {
        let outcome = store.delete_secret(&key.sibling(secret_name)).await?;
        log_delete("Secret", secret_name, key, outcome);
    }

    let outcome = store.delete_deployment(key).await?;
    log_delete("Deployment", &key.name, key, outcome);
    Ok(())
}

fn log_delete(kind: &str, name: &str, key: &ObjectKey, outcome: DeleteOutcome) {
    match outcome {
        DeleteOutcome::Deleted => info!(
            resource.name = %key.name,
            resource.namespace = %key.namespace,
            object.kind = kind,
            object.name = name,
            "Deleted dependent"
        ),
        DeleteOutcome::AlreadyAbsent => debug!(
            resource.name = %key.name,
            resource.namespace = %key.namespace,
            object.kind = kind,
            object.name = name,
            "Dependent already absent"
        ),
    }
}
