//! # Metrics
//!
//! Prometheus metrics for monitoring the operator and the ingestion function.
//!
//! ## Metrics Exposed
//!
//! - `shoplift_reconciliations_total` - Total number of reconciliations
//! - `shoplift_reconciliation_errors_total` - Total number of reconciliation errors
//! - `shoplift_reconciliation_duration_seconds` - Duration of reconciliation operations
//! - `shoplift_dependent_operations_total` - Dependent object writes by kind and operation
//! - `shoplift_ingestion_events_total` - Storage events handled by outcome
//! - `shoplift_storage_operations_total` - Object storage calls by operation
//! - `shoplift_storage_operation_errors_total` - Failed object storage calls by operation

use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "shoplift_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "shoplift_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "shoplift_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static DEPENDENT_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "shoplift_dependent_operations_total",
            "Total number of dependent object operations by kind and operation",
        ),
        &["kind", "operation"],
    )
    .expect("Failed to create DEPENDENT_OPERATIONS_TOTAL metric - this should never happen")
});

static INGESTION_EVENTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "shoplift_ingestion_events_total",
            "Total number of storage events handled by outcome",
        ),
        &["outcome"],
    )
    .expect("Failed to create INGESTION_EVENTS_TOTAL metric - this should never happen")
});

static STORAGE_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "shoplift_storage_operations_total",
            "Total number of object storage operations",
        ),
        &["operation"],
    )
    .expect("Failed to create STORAGE_OPERATIONS_TOTAL metric - this should never happen")
});

static STORAGE_OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "shoplift_storage_operation_errors_total",
            "Total number of failed object storage operations",
        ),
        &["operation"],
    )
    .expect("Failed to create STORAGE_OPERATION_ERRORS_TOTAL metric - this should never happen")
});

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(DEPENDENT_OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(INGESTION_EVENTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STORAGE_OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STORAGE_OPERATION_ERRORS_TOTAL.clone()))?;
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

/// Record a write against a dependent object, e.g. `("Deployment", "create")`
pub fn record_dependent_operation(kind: &str, operation: &str) {
    DEPENDENT_OPERATIONS_TOTAL
        .with_label_values(&[kind, operation])
        .inc();
}

pub fn increment_ingestion_events(outcome: &str) {
    INGESTION_EVENTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn increment_storage_operations(operation: &str) {
    STORAGE_OPERATIONS_TOTAL
        .with_label_values(&[operation])
        .inc();
}

pub fn increment_storage_operation_errors(operation: &str) {
    STORAGE_OPERATION_ERRORS_TOTAL
        .with_label_values(&[operation])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics() {
        // Registration is process-global; a second call from another test may
        // report AlreadyReg, which is fine as long as the first one succeeded.
        let _ = register_metrics();
        assert!(!REGISTRY.gather().is_empty());
    }

    #[test]
    fn test_increment_reconciliations() {
        let before = RECONCILIATIONS_TOTAL.get();
        increment_reconciliations();
        assert_eq!(RECONCILIATIONS_TOTAL.get(), before + 1);
    }

    #[test]
    fn test_increment_reconciliation_errors() {
        let before = RECONCILIATION_ERRORS_TOTAL.get();
        increment_reconciliation_errors();
        assert_eq!(RECONCILIATION_ERRORS_TOTAL.get(), before + 1);
    }

    #[test]
    fn test_observe_reconciliation_duration() {
        let before = RECONCILIATION_DURATION.get_sample_count();
        observe_reconciliation_duration(0.25);
        assert_eq!(RECONCILIATION_DURATION.get_sample_count(), before + 1);
    }

    #[test]
    fn test_record_dependent_operation() {
        let before = DEPENDENT_OPERATIONS_TOTAL
            .with_label_values(&["ConfigMap", "replace"])
            .get();
        record_dependent_operation("ConfigMap", "replace");
        let after = DEPENDENT_OPERATIONS_TOTAL
            .with_label_values(&["ConfigMap", "replace"])
            .get();
        assert_eq!(after, before + 1);
    }

    #[test]
    fn test_ingestion_and_storage_counters() {
        let before = INGESTION_EVENTS_TOTAL.with_label_values(&["skipped"]).get();
        increment_ingestion_events("skipped");
        assert_eq!(
            INGESTION_EVENTS_TOTAL.with_label_values(&["skipped"]).get(),
            before + 1
        );

        let before = STORAGE_OPERATION_ERRORS_TOTAL
            .with_label_values(&["copy"])
            .get();
        increment_storage_operation_errors("copy");
        assert_eq!(
            STORAGE_OPERATION_ERRORS_TOTAL
                .with_label_values(&["copy"])
                .get(),
            before + 1
        );
    }
}
