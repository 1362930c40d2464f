//! # Redis Spec
//!
//! Desired state of a managed Redis instance.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::status::RedisStatus;

/// Redis Custom Resource Definition
///
/// Declares one Redis cache instance. The operator converges a Deployment
/// named after the resource and a `<name>-secret` credential Secret toward it.
///
/// # Example
///
/// ```yaml
/// apiVersion: cache.tc/v1alpha1
/// kind: Redis
/// metadata:
///   name: sessions
///   namespace: default
/// spec:
///   image: redis
///   version: "6.2"
///   replicas: 3
///   storage:
///     size: 1Gi
///   resources:
///     requests:
///       cpu: 500m
///       memory: 512Mi
///     limits:
///       cpu: "1"
///       memory: 1Gi
/// ```
#[derive(CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "Redis",
    group = "cache.tc",
    version = "v1alpha1",
    plural = "redis",
    namespaced,
    status = "RedisStatus",
    derive = "PartialEq",
    shortname = "rd",
    printcolumn = r#"{"name":"Image", "type":"string", "jsonPath":".spec.image"}, {"name":"Version", "type":"string", "jsonPath":".spec.version"}, {"name":"Ready", "type":"integer", "jsonPath":".status.readyReplicas"}, {"name":"Total", "type":"integer", "jsonPath":".status.totalReplicas"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct RedisSpec {
    /// Container image repository (e.g. "redis")
    pub image: String,
    /// Image tag appended to `image` (e.g. "6.2")
    pub version: String,
    /// Storage request. Carried on the resource, not consumed by the operator.
    pub storage: RedisStorage,
    /// Desired replica count of the Deployment
    #[schemars(range(min = 0))]
    pub replicas: i32,
    /// Secret deleted during cleanup.
    /// The credential Secret itself is always named `<name>-secret`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
    /// Container resource requests and limits
    pub resources: RedisResources,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedisStorage {
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct RedisResources {
    pub requests: ResourceQuantities,
    pub limits: ResourceQuantities,
}

/// CPU and memory quantities in Kubernetes quantity format ("500m", "1Gi")
///
/// Values are kept as opaque strings; they are validated but never normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct ResourceQuantities {
    pub cpu: String,
    pub memory: String,
}

impl RedisSpec {
    /// Image reference handed to the container: `image:version`
    #[must_use]
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.version)
    }

    /// Name of the Secret removed by the cleanup path, if one is configured
    #[must_use]
    pub fn cleanup_secret_name(&self) -> Option<&str> {
        self.secret_name.as_deref().filter(|name| !name.is_empty())
    }
}
