//! # Status Management
//!
//! Projects the observed state of the owned Deployment onto the `Redis` status.

use crate::controller::reconciler::store::ClusterStore;
use crate::controller::reconciler::types::{ObjectKey, ReconcilerError};
use crate::crd::{Condition, Redis, RedisStatus};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentCondition};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use tracing::debug;

/// Status derived from the live Deployment
#[must_use]
pub fn project_status(deployment: &Deployment) -> RedisStatus {
    let Some(status) = deployment.status.as_ref() else {
        return RedisStatus::default();
    };

    RedisStatus {
        ready_replicas: status.ready_replicas.unwrap_or(0),
        total_replicas: status.replicas.unwrap_or(0),
        conditions: status
            .conditions
            .iter()
            .flatten()
            .map(project_condition)
            .collect(),
    }
}

fn project_condition(condition: &DeploymentCondition) -> Condition {
    Condition {
        r#type: condition.type_.clone(),
        status: condition.status.clone(),
        reason: condition.reason.clone(),
        message: condition.message.clone(),
        last_transition_time: condition.last_transition_time.as_ref().and_then(rfc3339),
    }
}

// Same text the API server uses on the wire
fn rfc3339(time: &Time) -> Option<String> {
    serde_json::to_value(time)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
}

/// Write the projected status of `deployment` onto `redis`
///
/// Only checks if status actually changed before updating, so a converged
/// object sees no write. Returns whether a write was issued.
///
/// # Errors
///
/// Returns [`ReconcilerError::Store`] when the status patch fails.
pub async fn sync_status(
    store: &dyn ClusterStore,
    redis: &Redis,
    key: &ObjectKey,
    deployment: &Deployment,
) -> Result<bool, ReconcilerError> {
    let projected = project_status(deployment);
    if redis.status.as_ref() == Some(&projected) {
        debug!(
            resource.name = %key.name,
            resource.namespace = %key.namespace,
            "Skipping status update - status unchanged"
        );
        return Ok(false);
    }

    store.update_redis_status(key, &projected).await?;
    debug!(
        resource.name = %key.name,
        resource.namespace = %key.namespace,
        ready = projected.ready_replicas,
        total = projected.total_replicas,
        "Updated status"
    );
    Ok(true)
}
