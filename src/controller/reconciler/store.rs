//! # Cluster Store
//!
//! The store operations the reconciler consumes, and the implementation backed
//! by the Kubernetes API.
//!
//! NotFound is not an error here: lookups return `None` and deletions report
//! [`DeleteOutcome::AlreadyAbsent`]. Every other failure is returned as-is so the
//! dispatcher can retry with backoff.

use crate::constants::FIELD_MANAGER;
use crate::controller::reconciler::types::ObjectKey;
use crate::crd::{Redis, RedisStatus};
use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, DeleteParams, Patch, PatchParams, PostParams};
use kube::Client;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// Result of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyAbsent,
}

/// Typed access to the objects the operator reads and writes
#[async_trait]
pub trait ClusterStore: Send + Sync {
    async fn get_redis(&self, key: &ObjectKey) -> Result<Option<Redis>>;
    /// Persist metadata and spec changes (finalizers)
    async fn update_redis(&self, redis: &Redis) -> Result<Redis>;
    /// Persist the status sub-object only
    async fn update_redis_status(&self, key: &ObjectKey, status: &RedisStatus) -> Result<()>;

    async fn get_secret(&self, key: &ObjectKey) -> Result<Option<Secret>>;
    async fn create_secret(&self, secret: &Secret) -> Result<()>;
    async fn delete_secret(&self, key: &ObjectKey) -> Result<DeleteOutcome>;

    async fn get_deployment(&self, key: &ObjectKey) -> Result<Option<Deployment>>;
    async fn create_deployment(&self, deployment: &Deployment) -> Result<()>;
    async fn update_deployment(&self, deployment: &Deployment) -> Result<()>;
    async fn delete_deployment(&self, key: &ObjectKey) -> Result<DeleteOutcome>;
}

/// [`ClusterStore`] backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl std::fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStore").finish_non_exhaustive()
    }
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Namespace of an object about to be written; objects always carry one here
fn namespace_of(meta: &k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta) -> Result<&str> {
    meta.namespace
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("object {:?} has no namespace", meta.name))
}

fn name_of(meta: &k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta) -> Result<&str> {
    meta.name
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("object in {:?} has no name", meta.namespace))
}

async fn delete_named<K>(api: Api<K>, name: &str) -> Result<DeleteOutcome>
where
    K: kube::Resource + Clone + DeserializeOwned + Debug,
{
    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => Ok(DeleteOutcome::Deleted),
        Err(kube::Error::Api(api_err)) if api_err.code == 404 => Ok(DeleteOutcome::AlreadyAbsent),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl ClusterStore for KubeStore {
    async fn get_redis(&self, key: &ObjectKey) -> Result<Option<Redis>> {
        Ok(self.api::<Redis>(&key.namespace).get_opt(&key.name).await?)
    }

    async fn update_redis(&self, redis: &Redis) -> Result<Redis> {
        let api = self.api::<Redis>(namespace_of(&redis.metadata)?);
        Ok(api
            .replace(name_of(&redis.metadata)?, &PostParams::default(), redis)
            .await?)
    }

    async fn update_redis_status(&self, key: &ObjectKey, status: &RedisStatus) -> Result<()> {
        let patch = serde_json::json!({
            "status": status
        });
        self.api::<Redis>(&key.namespace)
            .patch_status(
                &key.name,
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Merge(patch),
            )
            .await?;
        Ok(())
    }

    async fn get_secret(&self, key: &ObjectKey) -> Result<Option<Secret>> {
        Ok(self.api::<Secret>(&key.namespace).get_opt(&key.name).await?)
    }

    async fn create_secret(&self, secret: &Secret) -> Result<()> {
        self.api::<Secret>(namespace_of(&secret.metadata)?)
            .create(&PostParams::default(), secret)
            .await?;
        Ok(())
    }

    async fn delete_secret(&self, key: &ObjectKey) -> Result<DeleteOutcome> {
        delete_named(self.api::<Secret>(&key.namespace), &key.name).await
    }

    async fn get_deployment(&self, key: &ObjectKey) -> Result<Option<Deployment>> {
        Ok(self
            .api::<Deployment>(&key.namespace)
            .get_opt(&key.name)
            .await?)
    }

    async fn create_deployment(&self, deployment: &Deployment) -> Result<()> {
        self.api::<Deployment>(namespace_of(&deployment.metadata)?)
            .create(&PostParams::default(), deployment)
            .await?;
        Ok(())
    }

    async fn update_deployment(&self, deployment: &Deployment) -> Result<()> {
        // Replace carries the resourceVersion we read, so a concurrent writer
        // turns this into a 409 and the pass is retried on fresh state
        self.api::<Deployment>(namespace_of(&deployment.metadata)?)
            .replace(
                name_of(&deployment.metadata)?,
                &PostParams::default(),
                deployment,
            )
            .await?;
        Ok(())
    }

    async fn delete_deployment(&self, key: &ObjectKey) -> Result<DeleteOutcome> {
        delete_named(self.api::<Deployment>(&key.namespace), &key.name).await
    }
}
