//! # Redis Operator
//!
//! A Kubernetes operator that runs Redis cache instances declared as `Redis`
//! custom resources.
//!
//! ## Overview
//!
//! For every `Redis` the operator:
//!
//! 1. **Guards deletion** - Adds a finalizer and removes the dependents before the resource goes away
//! 2. **Generates credentials** - Creates a `<name>-secret` Secret holding a random password once
//! 3. **Runs the workload** - Creates a Deployment named after the resource and corrects drift in
//!    replica count, image and resources
//! 4. **Reports status** - Copies ready/total replicas and conditions from the Deployment
//!
//! ## Features
//!
//! - **Prometheus metrics**: Exposes metrics for monitoring and observability
//! - **Health probes**: HTTP endpoints for liveness and readiness checks
//! - **Per-resource backoff**: Failing resources retry on a Fibonacci schedule

use anyhow::Result;
use redis_operator::runtime::{initialization::initialize, watch_loop::run_watch_loop};

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialize().await?;

    run_watch_loop(
        init.client,
        init.redis_api,
        init.reconciler,
        init.server_state,
    )
    .await
}
