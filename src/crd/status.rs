//! # Redis Status
//!
//! Observed state copied from the owned Deployment.

use serde::{Deserialize, Serialize};

/// Status of the Redis resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedisStatus {
    /// Pods of the Deployment that are ready
    #[serde(default)]
    pub ready_replicas: i32,
    /// Pods of the Deployment, ready or not
    #[serde(default)]
    pub total_replicas: i32,
    /// Deployment conditions, in the order the Deployment reports them
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Condition represents a status condition for the resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of condition (True, False, Unknown)
    pub status: String,
    /// Reason for condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing condition
    #[serde(default)]
    pub message: Option<String>,
    /// Last transition time (RFC3339)
    #[serde(default)]
    pub last_transition_time: Option<String>,
}
