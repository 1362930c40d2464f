//! # Workload Builder
//!
//! Builds the desired Deployment of a `Redis`. Pure construction: the same
//! inputs always produce the same object.

use crate::constants::{PASSWORD_ENV_VAR, PASSWORD_KEY};
use crate::controller::reconciler::credential::AppLabels;
use crate::controller::reconciler::quantity::resource_list;
use crate::controller::reconciler::types::{ObjectKey, ReconcilerError};
use crate::crd::{Redis, RedisResources};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, EnvVar, EnvVarSource, PodSpec, PodTemplateSpec, ResourceRequirements,
    SecretKeySelector,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::Resource;

/// Build the Deployment for `redis`, binding the password from `secret_name`
///
/// # Errors
///
/// Returns [`ReconcilerError::InvalidQuantity`] when a request or limit is malformed.
pub fn build_deployment(
    redis: &Redis,
    key: &ObjectKey,
    secret_name: &str,
) -> Result<Deployment, ReconcilerError> {
    let labels = AppLabels::for_redis(key).to_map();

    let container = Container {
        name: key.name.clone(),
        image: Some(redis.spec.image_ref()),
        env: Some(vec![password_env(secret_name)]),
        resources: Some(resource_requirements(&redis.spec.resources)?),
        ..Container::default()
    };

    Ok(Deployment {
        metadata: ObjectMeta {
            name: Some(key.name.clone()),
            namespace: Some(key.namespace.clone()),
            labels: Some(labels.clone()),
            owner_references: redis.controller_owner_ref(&()).map(|owner| vec![owner]),
            ..ObjectMeta::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(redis.spec.replicas),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..LabelSelector::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..ObjectMeta::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    ..PodSpec::default()
                }),
            },
            ..DeploymentSpec::default()
        }),
        ..Deployment::default()
    })
}

/// Environment binding that resolves the password from the credential Secret
fn password_env(secret_name: &str) -> EnvVar {
    EnvVar {
        name: PASSWORD_ENV_VAR.to_string(),
        value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: secret_name.to_string(),
                key: PASSWORD_KEY.to_string(),
                optional: None,
            }),
            ..EnvVarSource::default()
        }),
        ..EnvVar::default()
    }
}

/// Requests and limits copied verbatim from the `Redis` `spec`
///
/// # Errors
///
/// Returns [`ReconcilerError::InvalidQuantity`] for the first malformed value.
pub fn resource_requirements(
    resources: &RedisResources,
) -> Result<ResourceRequirements, ReconcilerError> {
    Ok(ResourceRequirements {
        requests: Some(resource_list(
            &resources.requests,
            ("resources.requests.cpu", "resources.requests.memory"),
        )?),
        limits: Some(resource_list(
            &resources.limits,
            ("resources.limits.cpu", "resources.limits.memory"),
        )?),
        ..ResourceRequirements::default()
    })
}
