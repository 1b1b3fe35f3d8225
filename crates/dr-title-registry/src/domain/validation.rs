//! Input validation for caller-supplied references.
//!
//! References are opaque. Document references are stored verbatim; the only
//! content check is that a payment reference is not blank.

use shared_types::DocumentRef;

use super::entities::WorkflowConfig;
use crate::error::{WorkflowError, WorkflowResult};

/// Only rejects an empty list, and only when `require_documents` is set.
pub fn validate_documents(documents: &[DocumentRef], config: &WorkflowConfig) -> WorkflowResult<()> {
    if config.require_documents && documents.is_empty() {
        return Err(WorkflowError::validation(
            "document_references",
            "at least one document reference is required",
        ));
    }
    Ok(())
}

pub fn validate_payment_reference(reference: &str) -> WorkflowResult<()> {
    if reference.trim().is_empty() {
        return Err(WorkflowError::validation("payment_reference", "must not be empty"));
    }
    Ok(())
}
