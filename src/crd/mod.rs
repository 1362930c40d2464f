//! # Custom Resource Definitions
//!
//! The `Redis` resource (group `cache.tc`, version `v1alpha1`) and its status.
//!
//! - `spec`: desired state declared by the user
//! - `status`: observed state projected from the owned Deployment
//! - `registration`: explicit one-time CRD registration check run at startup

pub mod registration;
pub mod spec;
pub mod status;

pub use registration::{register, RegistrationError};
pub use spec::{Redis, RedisResources, RedisSpec, RedisStorage, ResourceQuantities};
pub use status::{Condition, RedisStatus};
