//! Error types for the title registry
//!
//! Every error aborts the operation that raised it with zero mutation and
//! zero audit emission. Callers recover by resubmitting under corrected
//! conditions; nothing is retried internally.

use shared_types::{Identity, PropertyId, Role};
use thiserror::Error;

use crate::domain::RequestStatus;

/// Coarse classification of [`WorkflowError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller lacks the required role or is not the current owner.
    Authorization,
    /// Operation is invalid for the current request status.
    State,
    /// A commit-time re-check failed.
    InvariantViolation,
    /// A required field is empty or malformed.
    Validation,
    /// The durable audit sink refused the append.
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Authorization => "authorization",
            ErrorKind::State => "state",
            ErrorKind::InvariantViolation => "invariant_violation",
            ErrorKind::Validation => "validation",
            ErrorKind::Storage => "storage",
        }
    }
}

/// Title registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Caller does not hold the role the operation requires
    #[error("Unauthorized: {caller} does not hold the {required} role")]
    MissingRole { caller: Identity, required: Role },

    /// Transfer requested by someone other than the current owner
    #[error("Unauthorized: {caller} is not the owner of property {property_id}")]
    NotOwner {
        caller: Identity,
        property_id: PropertyId,
    },

    /// Registration requested for a property that already has an owner
    #[error("Property {property_id} is already registered")]
    AlreadyRegistered { property_id: PropertyId },

    /// A transfer is in flight for this property
    #[error("Property {property_id} already has a pending transfer")]
    TransferPending { property_id: PropertyId },

    /// Operation requires a different request status
    #[error("{operation} on property {property_id} requires status {expected:?}, found {actual:?}")]
    UnexpectedStatus {
        property_id: PropertyId,
        operation: &'static str,
        expected: RequestStatus,
        actual: RequestStatus,
    },

    /// Documents were already approved for the live request
    #[error("Documents for property {property_id} are already approved")]
    DocsAlreadyApproved { property_id: PropertyId },

    /// Finalization attempted before notary approval
    #[error("Documents for property {property_id} have not been approved")]
    DocsNotApproved { property_id: PropertyId },

    /// Defensive re-check failed at commit time
    #[error("Invariant violation on property {property_id}: {detail}")]
    InvariantViolation {
        property_id: PropertyId,
        detail: String,
    },

    /// Input field empty or malformed
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Audit sink failure
    #[error("Audit storage error: {0}")]
    Storage(String),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::MissingRole { .. } | WorkflowError::NotOwner { .. } => {
                ErrorKind::Authorization
            }
            WorkflowError::AlreadyRegistered { .. }
            | WorkflowError::TransferPending { .. }
            | WorkflowError::UnexpectedStatus { .. }
            | WorkflowError::DocsAlreadyApproved { .. }
            | WorkflowError::DocsNotApproved { .. } => ErrorKind::State,
            WorkflowError::InvariantViolation { .. } => ErrorKind::InvariantViolation,
            WorkflowError::Validation { .. } => ErrorKind::Validation,
            WorkflowError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        WorkflowError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for registry operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
