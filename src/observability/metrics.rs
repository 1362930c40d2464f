//! # Metrics
//!
//! Prometheus metrics for monitoring the operator.
//!
//! ## Metrics Exposed
//!
//! - `redis_operator_reconciliations_total` - Total number of reconciliation passes
//! - `redis_operator_reconciliation_errors_total` - Total number of failed passes
//! - `redis_operator_reconciliation_duration_seconds` - Duration of reconciliation passes
//! - `redis_operator_requeues_total` - Requeues by reason (`workload_created`, `error`)
//! - `redis_operator_drift_corrections_total` - Drift corrections by category
//! - `redis_operator_resources_created_total` - Sub-resources created by kind
//! - `redis_operator_cleanups_total` - Completed finalizer cleanups

use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "redis_operator_reconciliations_total",
        "Total number of reconciliation passes",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "redis_operator_reconciliation_errors_total",
        "Total number of reconciliation passes that returned an error",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "redis_operator_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "redis_operator_requeues_total",
            "Total number of requeues by reason",
        ),
        &["reason"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

static DRIFT_CORRECTIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "redis_operator_drift_corrections_total",
            "Total number of workload drift corrections by category",
        ),
        &["category"],
    )
    .expect("Failed to create DRIFT_CORRECTIONS_TOTAL metric - this should never happen")
});

static RESOURCES_CREATED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "redis_operator_resources_created_total",
            "Total number of dependent resources created by kind",
        ),
        &["kind"],
    )
    .expect("Failed to create RESOURCES_CREATED_TOTAL metric - this should never happen")
});

static CLEANUPS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "redis_operator_cleanups_total",
        "Total number of finalizer cleanups completed",
    )
    .expect("Failed to create CLEANUPS_TOTAL metric - this should never happen")
});

/// Register all metrics with the shared registry
///
/// # Errors
///
/// Fails when a metric is registered twice.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DRIFT_CORRECTIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RESOURCES_CREATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CLEANUPS_TOTAL.clone()))?;

    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_requeues(reason: &str) {
    REQUEUES_TOTAL.with_label_values(&[reason]).inc();
}

pub fn increment_drift_corrections(category: &str) {
    DRIFT_CORRECTIONS_TOTAL.with_label_values(&[category]).inc();
}

pub fn increment_resources_created(kind: &str) {
    RESOURCES_CREATED_TOTAL.with_label_values(&[kind]).inc();
}

pub fn increment_cleanups() {
    CLEANUPS_TOTAL.inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics() {
        assert!(register_metrics().is_ok());
    }

    #[test]
    fn test_increment_reconciliations() {
        let before = RECONCILIATIONS_TOTAL.get();
        increment_reconciliations();
        assert_eq!(RECONCILIATIONS_TOTAL.get(), before + 1u64);
    }

    #[test]
    fn test_increment_reconciliation_errors() {
        let before = RECONCILIATION_ERRORS_TOTAL.get();
        increment_reconciliation_errors();
        assert_eq!(RECONCILIATION_ERRORS_TOTAL.get(), before + 1u64);
    }

    #[test]
    fn test_observe_reconciliation_duration() {
        let before = RECONCILIATION_DURATION.get_sample_count();
        observe_reconciliation_duration(0.2);
        assert_eq!(RECONCILIATION_DURATION.get_sample_count(), before + 1u64);
    }

    #[test]
    fn test_labelled_counters() {
        let drift_before = DRIFT_CORRECTIONS_TOTAL.with_label_values(&["image"]).get();
        increment_drift_corrections("image");
        assert_eq!(
            DRIFT_CORRECTIONS_TOTAL.with_label_values(&["image"]).get(),
            drift_before + 1u64
        );

        let created_before = RESOURCES_CREATED_TOTAL.with_label_values(&["Secret"]).get();
        increment_resources_created("Secret");
        assert_eq!(
            RESOURCES_CREATED_TOTAL.with_label_values(&["Secret"]).get(),
            created_before + 1u64
        );

        let requeue_before = REQUEUES_TOTAL.with_label_values(&["error"]).get();
        increment_requeues("error");
        assert_eq!(
            REQUEUES_TOTAL.with_label_values(&["error"]).get(),
            requeue_before + 1u64
        );
    }
}
