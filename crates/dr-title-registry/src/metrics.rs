//! # Registry Metrics
//!
//! Prometheus metrics for workflow throughput and rejections.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! dr-title-registry = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `registry_transitions_committed_total{operation}` - Committed operations
//! - `registry_operations_rejected_total{operation, kind}` - Rejected operations by error kind
//! - `registry_audit_records_total` - Audit records appended
//! - `registry_role_changes_total{change}` - Role grants and revocations
//! - `registry_active_requests` - Properties with a pending request

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter, IntCounterVec,
    IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref TRANSITIONS_COMMITTED: IntCounterVec = register_int_counter_vec!(
        "registry_transitions_committed_total",
        "Total number of committed workflow operations",
        &["operation"]
    )
    .expect("Failed to create TRANSITIONS_COMMITTED metric");

    pub static ref OPERATIONS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "registry_operations_rejected_total",
        "Total number of rejected workflow operations",
        &["operation", "kind"]
    )
    .expect("Failed to create OPERATIONS_REJECTED metric");

    pub static ref AUDIT_RECORDS: IntCounter = register_int_counter!(
        "registry_audit_records_total",
        "Total number of audit records appended"
    )
    .expect("Failed to create AUDIT_RECORDS metric");

    pub static ref ROLE_CHANGES: IntCounterVec = register_int_counter_vec!(
        "registry_role_changes_total",
        "Total number of role grants and revocations",
        &["change"]
    )
    .expect("Failed to create ROLE_CHANGES metric");

    pub static ref ACTIVE_REQUESTS: IntGauge = register_int_gauge!(
        "registry_active_requests",
        "Number of properties with a pending registration or transfer"
    )
    .expect("Failed to create ACTIVE_REQUESTS metric");
}

#[cfg(feature = "metrics")]
pub fn record_transition_committed(operation: &str, audit_records: usize) {
    TRANSITIONS_COMMITTED.with_label_values(&[operation]).inc();
    AUDIT_RECORDS.inc_by(audit_records as u64);
}

#[cfg(feature = "metrics")]
pub fn record_operation_rejected(operation: &str, kind: &str) {
    OPERATIONS_REJECTED.with_label_values(&[operation, kind]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_role_change(change: &str) {
    ROLE_CHANGES.with_label_values(&[change]).inc();
}

#[cfg(feature = "metrics")]
pub fn set_active_requests(count: usize) {
    ACTIVE_REQUESTS.set(count as i64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_transition_committed(_operation: &str, _audit_records: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_operation_rejected(_operation: &str, _kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_role_change(_change: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn set_active_requests(_count: usize) {}
