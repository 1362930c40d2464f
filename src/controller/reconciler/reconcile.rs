//! # Reconciliation Logic
//!
//! One reconciliation pass for a `Redis` resource.
//!
//! Order of operations:
//!
//! 1. Fetch the `Redis`; a missing object releases it.
//! 2. Drive the finalizer. A terminating object is cleaned up and released.
//! 3. Ensure the `<name>-secret` credential Secret exists.
//! 4. Ensure the Deployment exists. A freshly created Deployment requeues.
//! 5. Correct drift on the live Deployment with a single update.
//! 6. Project the Deployment status onto the `Redis` status.
//!
//! Every store error is returned unchanged; the error policy retries with
//! backoff.

use crate::controller::reconciler::credential::{
    build_credential_secret, credential_secret_name, generate_password,
};
use crate::controller::reconciler::drift::correct_drift;
use crate::controller::reconciler::finalizer::drive_finalizer;
use crate::controller::reconciler::status::sync_status;
use crate::controller::reconciler::store::ClusterStore;
use crate::controller::reconciler::types::{
    ObjectKey, ReconcileOutcome, Reconciler, ReconcilerError,
};
use crate::controller::reconciler::workload::build_deployment;
use crate::crd::Redis;
use crate::observability;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, Instrument};

/// Entry point handed to the kube-runtime controller
///
/// # Errors
///
/// Returns the [`ReconcilerError`] of the failed step; the error policy
/// decides when to retry.
pub async fn reconcile(redis: Arc<Redis>, ctx: Arc<Reconciler>) -> Result<Action, ReconcilerError> {
    let key = ObjectKey::for_resource(redis.as_ref())?;
    let span = tracing::span!(
        tracing::Level::INFO,
        "reconcile",
        resource.name = %key.name,
        resource.namespace = %key.namespace,
        resource.kind = "Redis"
    );

    async move {
        let start = Instant::now();
        observability::metrics::increment_reconciliations();

        let result = reconcile_object(ctx.store.as_ref(), &key).await;
        observability::metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());

        let outcome = result?;
        if outcome == ReconcileOutcome::Released {
            if ctx.forget_backoff(&key) {
                debug!("Dropped error backoff of released resource");
            }
        } else if ctx.reset_backoff(&key) {
            debug!("Reset error backoff after successful reconciliation");
        }
        debug!(outcome = outcome.as_str(), "Reconciliation finished");

        Ok(match outcome {
            ReconcileOutcome::Done | ReconcileOutcome::Released => Action::await_change(),
            ReconcileOutcome::Requeue => {
                Action::requeue(ctx.config.create_requeue_duration())
            }
        })
    }
    .instrument(span)
    .await
}

/// Run one pass for the `Redis` identified by `key`
///
/// # Errors
///
/// Returns the first failing step's error. Changes persisted before the
/// failure stay persisted.
pub async fn reconcile_object(
    store: &dyn ClusterStore,
    key: &ObjectKey,
) -> Result<ReconcileOutcome, ReconcilerError> {
    let Some(redis) = store.get_redis(key).await? else {
        info!(
            resource.name = %key.name,
            resource.namespace = %key.namespace,
            "Redis resource not found, ignoring since object must be deleted"
        );
        return Ok(ReconcileOutcome::Released);
    };

    let (phase, redis) = drive_finalizer(store, redis, key).await?;
    if phase.is_terminating() {
        return Ok(ReconcileOutcome::Released);
    }

    let secret_name = ensure_credential_secret(store, &redis, key).await?;

    let Some(mut deployment) = store.get_deployment(key).await? else {
        let deployment = build_deployment(&redis, key, &secret_name)?;
        store.create_deployment(&deployment).await?;
        observability::metrics::increment_resources_created("Deployment");
        observability::metrics::increment_requeues("workload_created");
        info!(
            resource.name = %key.name,
            resource.namespace = %key.namespace,
            "Created Deployment"
        );
        return Ok(ReconcileOutcome::Requeue);
    };

    let drift = correct_drift(&mut deployment, &redis.spec)?;
    if !drift.is_empty() {
        store.update_deployment(&deployment).await?;
        for category in &drift {
            observability::metrics::increment_drift_corrections(category.as_str());
            info!(
                resource.name = %key.name,
                resource.namespace = %key.namespace,
                drift.category = category.as_str(),
                "Corrected Deployment drift"
            );
        }
    }

    sync_status(store, &redis, key, &deployment).await?;
    Ok(ReconcileOutcome::Done)
}

/// Create the credential Secret unless it already exists; returns its name
async fn ensure_credential_secret(
    store: &dyn ClusterStore,
    redis: &Redis,
    key: &ObjectKey,
) -> Result<String, ReconcilerError> {
    let secret_name = credential_secret_name(&key.name);
    let secret_key = key.sibling(secret_name.clone());

    if store.get_secret(&secret_key).await?.is_some() {
        return Ok(secret_name);
    }

    let password = generate_password()?;
    let secret = build_credential_secret(redis, key, &password);
    store.create_secret(&secret).await?;
    observability::metrics::increment_resources_created("Secret");
    info!(
        resource.name = %key.name,
        resource.namespace = %key.namespace,
        secret.name = %secret_name,
        "Created credential Secret"
    );
    Ok(secret_name)
}
