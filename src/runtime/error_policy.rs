//! # Error Policy
//!
//! Error handling and backoff logic for the controller watch loop.
//! This module handles reconciliation errors and controller stream errors.

use crate::controller::reconciler::{ObjectKey, Reconciler, ReconcilerError};
use crate::crd::Redis;
use crate::observability;
use kube_runtime::controller::{self, Action};
use kube_runtime::watcher;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Handle reconciliation errors with Fibonacci backoff
///
/// Backoff state is tracked per resource so one failing `Redis` does not slow
/// down the others. A successful pass resets it.
pub fn handle_reconciliation_error(
    obj: Arc<Redis>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let key = ObjectKey::for_resource(obj.as_ref()).unwrap_or_else(|_| {
        ObjectKey::new(
            obj.metadata.namespace.as_deref().unwrap_or("default"),
            obj.metadata.name.as_deref().unwrap_or("unknown"),
        )
    });

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.reconciliation_error",
        resource.name = %key.name,
        resource.namespace = %key.namespace,
        error = %error
    );
    let _error_guard = error_span.enter();

    if error.is_permanent() {
        error!("Reconciliation failed for {} and needs a spec change: {}", key, error);
    } else {
        error!("Reconciliation error for {}: {:?}", key, error);
    }
    observability::metrics::increment_reconciliation_errors();

    let (backoff_seconds, error_count) = ctx.next_backoff(&key).unwrap_or_else(|| {
        warn!("Failed to lock backoff states, using maximum backoff");
        (ctx.config.backoff_max_secs, 0)
    });

    info!(
        "Retrying {} with Fibonacci backoff: {}s (error count: {})",
        key, backoff_seconds, error_count
    );

    observability::metrics::increment_requeues("error");
    Action::requeue(Duration::from_secs(backoff_seconds))
}

/// Log an item of the controller stream that carries an error
///
/// Reconciler failures were already handled by [`handle_reconciliation_error`]
/// and are only traced here.
pub fn log_controller_stream_error(
    err: &controller::Error<ReconcilerError, watcher::Error>,
) {
    match err {
        controller::Error::ReconcilerFailed(error, obj_ref) => {
            debug!("Reconciler failed for {}: {}", obj_ref, error);
        }
        controller::Error::ObjectNotFound(obj_ref) => {
            debug!("Object {} no longer in cache, skipping", obj_ref);
        }
        controller::Error::QueueError(error) => {
            warn!("Watch error, stream will retry: {}", error);
        }
        other => {
            error!("Controller stream error: {}", other);
        }
    }
}
