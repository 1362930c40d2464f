//! # Drift Detection
//!
//! Compares the tracked fields of a live Deployment with the values derived
//! from the `Redis` spec and corrects the ones that differ.
//!
//! Tracked fields: replica count, image of the first container, and that
//! container's CPU/memory requests and limits. Everything else on the live
//! object is left untouched. Quantities are compared as text.

use crate::controller::reconciler::quantity::{resource_list, CPU, MEMORY};
use crate::controller::reconciler::types::ReconcilerError;
use crate::crd::{RedisSpec, ResourceQuantities};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Container;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

/// Replica count assumed by the API server when a Deployment omits it
const DEFAULT_REPLICAS: i32 = 1;

/// The tracked fields of a workload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadShape {
    pub replicas: i32,
    pub image: String,
    pub requests: ResourceQuantities,
    pub limits: ResourceQuantities,
}

impl WorkloadShape {
    /// Shape the `Redis` `spec` asks for
    #[must_use]
    pub fn desired(spec: &RedisSpec) -> Self {
        Self {
            replicas: spec.replicas,
            image: spec.image_ref(),
            requests: spec.resources.requests.clone(),
            limits: spec.resources.limits.clone(),
        }
    }

    /// Shape currently carried by `deployment`
    ///
    /// Missing values read as empty strings so they always count as drift.
    #[must_use]
    pub fn observed(deployment: &Deployment) -> Self {
        let spec = deployment.spec.as_ref();
        let container = spec
            .and_then(|s| s.template.spec.as_ref())
            .and_then(|pod| pod.containers.first());
        let resources = container.and_then(|c| c.resources.as_ref());

        Self {
            replicas: spec.and_then(|s| s.replicas).unwrap_or(DEFAULT_REPLICAS),
            image: container
                .and_then(|c| c.image.clone())
                .unwrap_or_default(),
            requests: quantities_of(resources.and_then(|r| r.requests.as_ref())),
            limits: quantities_of(resources.and_then(|r| r.limits.as_ref())),
        }
    }
}

fn quantities_of(list: Option<&BTreeMap<String, Quantity>>) -> ResourceQuantities {
    let get = |name: &str| {
        list.and_then(|l| l.get(name))
            .map(|q| q.0.clone())
            .unwrap_or_default()
    };
    ResourceQuantities {
        cpu: get(CPU),
        memory: get(MEMORY),
    }
}

/// Group of tracked fields that changed together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftCategory {
    Size,
    Image,
    Resources,
}

impl DriftCategory {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DriftCategory::Size => "size",
            DriftCategory::Image => "image",
            DriftCategory::Resources => "resources",
        }
    }
}

/// Categories in which `observed` differs from `desired`
#[must_use]
pub fn detect_drift(desired: &WorkloadShape, observed: &WorkloadShape) -> Vec<DriftCategory> {
    let mut drift = Vec::new();
    if desired.replicas != observed.replicas {
        drift.push(DriftCategory::Size);
    }
    if desired.image != observed.image {
        drift.push(DriftCategory::Image);
    }
    if desired.requests != observed.requests || desired.limits != observed.limits {
        drift.push(DriftCategory::Resources);
    }
    drift
}

/// Rewrite every drifted field of `deployment` to the value derived from `spec`
///
/// Returns the corrected categories; an empty list means `deployment` was not
/// modified.
///
/// # Errors
///
/// Returns [`ReconcilerError::InvalidQuantity`] when resources drifted and the
/// spec carries a malformed quantity. `deployment` is unchanged in that case.
pub fn correct_drift(
    deployment: &mut Deployment,
    spec: &RedisSpec,
) -> Result<Vec<DriftCategory>, ReconcilerError> {
    let desired = WorkloadShape::desired(spec);
    let drift = detect_drift(&desired, &WorkloadShape::observed(deployment));
    if drift.is_empty() {
        return Ok(drift);
    }

    let resource_lists = if drift.contains(&DriftCategory::Resources) {
        Some((
            resource_list(
                &desired.requests,
                ("resources.requests.cpu", "resources.requests.memory"),
            )?,
            resource_list(
                &desired.limits,
                ("resources.limits.cpu", "resources.limits.memory"),
            )?,
        ))
    } else {
        None
    };

    let container_name = deployment.metadata.name.clone().unwrap_or_default();
    let deployment_spec = deployment.spec.get_or_insert_with(Default::default);

    if drift.contains(&DriftCategory::Size) {
        deployment_spec.replicas = Some(desired.replicas);
    }

    let pod_spec = deployment_spec
        .template
        .spec
        .get_or_insert_with(Default::default);
    if pod_spec.containers.is_empty() {
        pod_spec.containers.push(Container {
            name: container_name,
            ..Container::default()
        });
    }
    let Some(container) = pod_spec.containers.first_mut() else {
        return Ok(drift);
    };

    if drift.contains(&DriftCategory::Image) {
        container.image = Some(desired.image);
    }

    if let Some((requests, limits)) = resource_lists {
        let resources = container.resources.get_or_insert_with(Default::default);
        resources
            .requests
            .get_or_insert_with(BTreeMap::new)
            .extend(requests);
        resources
            .limits
            .get_or_insert_with(BTreeMap::new)
            .extend(limits);
    }

    Ok(drift)
}
