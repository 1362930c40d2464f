//! Common test utilities for reconciler integration tests
//!
//! Provides an in-memory [`ClusterStore`] that records every mutating call and
//! can be told to fail specific operations, plus builders for `Redis` objects.

#![allow(dead_code, reason = "each test binary uses a different subset of helpers")]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Secret;
use kube::Resource;
use redis_operator::controller::reconciler::{ClusterStore, DeleteOutcome, ObjectKey};
use redis_operator::crd::{Redis, RedisStatus};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};

pub const NAMESPACE: &str = "default";

/// Store operations a test can make fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    GetRedis,
    UpdateRedis,
    UpdateRedisStatus,
    GetSecret,
    CreateSecret,
    DeleteSecret,
    GetDeployment,
    CreateDeployment,
    UpdateDeployment,
    DeleteDeployment,
}

/// A mutating call as seen by the store, with the target "namespace/name"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    UpdateRedis(String),
    UpdateRedisStatus(String),
    CreateSecret(String),
    DeleteSecret(String),
    CreateDeployment(String),
    UpdateDeployment(String),
    DeleteDeployment(String),
}

#[derive(Debug, Default)]
struct State {
    redis: BTreeMap<ObjectKey, Redis>,
    secrets: BTreeMap<ObjectKey, Secret>,
    deployments: BTreeMap<ObjectKey, Deployment>,
    calls: Vec<Call>,
    failures: HashSet<Op>,
}

/// In-memory cluster
///
/// Mirrors the API server behaviours the reconciler relies on: creating an
/// existing object conflicts, updating a terminating `Redis` without
/// finalizers removes it.
#[derive(Debug, Default)]
pub struct FakeStore {
    state: Mutex<State>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_redis(redis: Redis) -> Self {
        let store = Self::new();
        store.insert_redis(redis);
        store
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn insert_redis(&self, redis: Redis) {
        let key = ObjectKey::for_resource(&redis).unwrap();
        self.state().redis.insert(key, redis);
    }

    pub fn insert_secret(&self, secret: Secret) {
        let key = ObjectKey::for_resource(&secret).unwrap();
        self.state().secrets.insert(key, secret);
    }

    pub fn insert_deployment(&self, deployment: Deployment) {
        let key = ObjectKey::for_resource(&deployment).unwrap();
        self.state().deployments.insert(key, deployment);
    }

    pub fn redis(&self, key: &ObjectKey) -> Option<Redis> {
        self.state().redis.get(key).cloned()
    }

    pub fn secret(&self, key: &ObjectKey) -> Option<Secret> {
        self.state().secrets.get(key).cloned()
    }

    pub fn deployment(&self, key: &ObjectKey) -> Option<Deployment> {
        self.state().deployments.get(key).cloned()
    }

    /// Apply `f` to a stored `Redis`, as a user editing the resource would
    pub fn edit_redis(&self, key: &ObjectKey, f: impl FnOnce(&mut Redis)) {
        let mut state = self.state();
        f(state.redis.get_mut(key).unwrap());
    }

    /// Apply `f` to a stored Deployment, as another actor would
    pub fn edit_deployment(&self, key: &ObjectKey, f: impl FnOnce(&mut Deployment)) {
        let mut state = self.state();
        f(state.deployments.get_mut(key).unwrap());
    }

    /// Set the Deployment status the way the Deployment controller would
    pub fn set_deployment_status(&self, key: &ObjectKey, status: serde_json::Value) {
        self.edit_deployment(key, |deployment| {
            deployment.status = Some(serde_json::from_value(status).unwrap());
        });
    }

    pub fn remove_deployment(&self, key: &ObjectKey) {
        self.state().deployments.remove(key);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn fail_on(&self, op: Op) {
        self.state().failures.insert(op);
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    fn check(&self, op: Op) -> Result<()> {
        if self.state().failures.contains(&op) {
            Err(anyhow!("injected failure for {op:?}"))
        } else {
            Ok(())
        }
    }

    fn record(&self, call: Call) {
        self.state().calls.push(call);
    }
}

#[async_trait]
impl ClusterStore for FakeStore {
    async fn get_redis(&self, key: &ObjectKey) -> Result<Option<Redis>> {
        self.check(Op::GetRedis)?;
        Ok(self.redis(key))
    }

    async fn update_redis(&self, redis: &Redis) -> Result<Redis> {
        let key = ObjectKey::for_resource(redis)?;
        self.record(Call::UpdateRedis(key.to_string()));
        self.check(Op::UpdateRedis)?;

        let mut state = self.state();
        if !state.redis.contains_key(&key) {
            return Err(anyhow!("redis {key} not found"));
        }
        let released = redis.meta().deletion_timestamp.is_some()
            && redis.meta().finalizers.as_ref().map_or(true, Vec::is_empty);
        if released {
            state.redis.remove(&key);
        } else {
            state.redis.insert(key, redis.clone());
        }
        Ok(redis.clone())
    }

    async fn update_redis_status(&self, key: &ObjectKey, status: &RedisStatus) -> Result<()> {
        self.record(Call::UpdateRedisStatus(key.to_string()));
        self.check(Op::UpdateRedisStatus)?;

        let mut state = self.state();
        let redis = state
            .redis
            .get_mut(key)
            .ok_or_else(|| anyhow!("redis {key} not found"))?;
        redis.status = Some(status.clone());
        Ok(())
    }

    async fn get_secret(&self, key: &ObjectKey) -> Result<Option<Secret>> {
        self.check(Op::GetSecret)?;
        Ok(self.secret(key))
    }

    async fn create_secret(&self, secret: &Secret) -> Result<()> {
        let key = ObjectKey::for_resource(secret)?;
        self.record(Call::CreateSecret(key.to_string()));
        self.check(Op::CreateSecret)?;

        let mut state = self.state();
        if state.secrets.contains_key(&key) {
            return Err(anyhow!("secret {key} already exists"));
        }
        state.secrets.insert(key, secret.clone());
        Ok(())
    }

    async fn delete_secret(&self, key: &ObjectKey) -> Result<DeleteOutcome> {
        self.record(Call::DeleteSecret(key.to_string()));
        self.check(Op::DeleteSecret)?;

        Ok(match self.state().secrets.remove(key) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::AlreadyAbsent,
        })
    }

    async fn get_deployment(&self, key: &ObjectKey) -> Result<Option<Deployment>> {
        self.check(Op::GetDeployment)?;
        Ok(self.deployment(key))
    }

    async fn create_deployment(&self, deployment: &Deployment) -> Result<()> {
        let key = ObjectKey::for_resource(deployment)?;
        self.record(Call::CreateDeployment(key.to_string()));
        self.check(Op::CreateDeployment)?;

        let mut state = self.state();
        if state.deployments.contains_key(&key) {
            return Err(anyhow!("deployment {key} already exists"));
        }
        state.deployments.insert(key, deployment.clone());
        Ok(())
    }

    async fn update_deployment(&self, deployment: &Deployment) -> Result<()> {
        let key = ObjectKey::for_resource(deployment)?;
        self.record(Call::UpdateDeployment(key.to_string()));
        self.check(Op::UpdateDeployment)?;

        let mut state = self.state();
        if !state.deployments.contains_key(&key) {
            return Err(anyhow!("deployment {key} not found"));
        }
        state.deployments.insert(key, deployment.clone());
        Ok(())
    }

    async fn delete_deployment(&self, key: &ObjectKey) -> Result<DeleteOutcome> {
        self.record(Call::DeleteDeployment(key.to_string()));
        self.check(Op::DeleteDeployment)?;

        Ok(match self.state().deployments.remove(key) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::AlreadyAbsent,
        })
    }
}

pub fn key(name: &str) -> ObjectKey {
    ObjectKey::new(NAMESPACE, name)
}

/// The `Redis` `spec` used throughout the tests: redis 6.2, three replicas
pub fn spec_json() -> serde_json::Value {
    serde_json::json!({
        "image": "redis",
        "version": "6.2",
        "replicas": 3,
        "storage": { "size": "1Gi" },
        "resources": {
            "requests": { "cpu": "500m", "memory": "512Mi" },
            "limits": { "cpu": "1", "memory": "1Gi" }
        }
    })
}

/// A `Redis` with the given extra metadata merged over name, namespace and uid
pub fn redis_with(name: &str, metadata: serde_json::Value, spec: serde_json::Value) -> Redis {
    let mut meta = serde_json::json!({
        "name": name,
        "namespace": NAMESPACE,
        "uid": format!("uid-{name}"),
        "resourceVersion": "1"
    });
    if let (Some(base), Some(extra)) = (meta.as_object_mut(), metadata.as_object()) {
        base.extend(extra.clone());
    }
    serde_json::from_value(serde_json::json!({
        "apiVersion": "cache.tc/v1alpha1",
        "kind": "Redis",
        "metadata": meta,
        "spec": spec
    }))
    .unwrap()
}

pub fn sample_redis(name: &str) -> Redis {
    redis_with(name, serde_json::json!({}), spec_json())
}

/// A `Redis` that has been asked to go away
pub fn terminating_redis(name: &str, finalizers: &[&str], spec: serde_json::Value) -> Redis {
    redis_with(
        name,
        serde_json::json!({
            "deletionTimestamp": "2024-05-01T10:00:00Z",
            "finalizers": finalizers
        }),
        spec,
    )
}

/// A ready Deployment status for `replicas` pods
pub fn ready_status(replicas: i32) -> serde_json::Value {
    serde_json::json!({
        "replicas": replicas,
        "readyReplicas": replicas,
        "conditions": [{
            "type": "Available",
            "status": "True",
            "reason": "MinimumReplicasAvailable",
            "message": "Deployment has minimum availability.",
            "lastTransitionTime": "2024-05-01T10:00:00Z"
        }]
    })
}

/// JSON log lines captured while a test runs
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Install a JSON subscriber for the current thread; logs stop being
    /// captured when the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let logs = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || logs.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Parsed `fields` object of every captured event
    pub fn events(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap()["fields"].clone())
            .collect()
    }

    /// Fields of the first event with the given message
    pub fn event(&self, message: &str) -> Option<serde_json::Value> {
        self.events()
            .into_iter()
            .find(|fields| fields["message"] == message)
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
