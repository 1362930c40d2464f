//! Redis Operator Library
//!
//! This library provides the core functionality of the Redis operator: the
//! `Redis` custom resource, the reconciler that converges a Deployment and a
//! credential Secret toward it, and the runtime that drives the reconciler.
//!
//! ## Quick Start
//!
//! ```rust
//! use redis_operator::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod prelude;
pub mod runtime;
