//! # Domain Entities for the Title Registry
//!
//! ## Request Lifecycle
//!
//! ```text
//! [None] ──request_registration──→ [PendingRegistration] ──finalize_registration──→ [Registered]
//!                                        ↑      │                                      │
//!                                        └──────┘ (re-submission)                      │
//!                                                                                      │
//! [Registered] ──request_transfer──→ [PendingTransfer] ──record_payment_and_finalize──┘
//! ```
//!
//! Notary approval (`docs_approved`) is a flag inside each pending status, not
//! a status of its own.

use serde::{Deserialize, Serialize};
use shared_types::{DocumentRef, Identity, PaymentRef, PropertyId, Timestamp};

/// Status of the live request for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Never requested.
    #[default]
    None,
    /// First registration awaiting approval and finalization.
    PendingRegistration,
    /// Ownership transfer awaiting approval, payment and finalization.
    PendingTransfer,
    /// Dormant: the last request completed.
    Registered,
}

impl RequestStatus {
    /// True while a request is in flight.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RequestStatus::PendingRegistration | RequestStatus::PendingTransfer
        )
    }
}

/// The single live (or most recently completed) request for a property.
///
/// Timestamps are zero until set. A new submission supersedes the previous
/// request in place; history lives in the audit log only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub property_id: PropertyId,
    /// Who initiated the request.
    pub requester: Option<Identity>,
    /// Owner at request time; absent for first registration.
    pub current_owner_snapshot: Option<Identity>,
    /// Candidate new owner. Cleared once a transfer finalizes.
    pub pending_owner: Option<Identity>,
    pub document_references: Vec<DocumentRef>,
    pub docs_approved: bool,
    /// Transfer flow only.
    pub payment_reference: Option<PaymentRef>,
    pub requested_at: Timestamp,
    pub docs_approved_at: Timestamp,
    pub finalized_at: Timestamp,
    pub status: RequestStatus,
}

impl Request {
    /// The record returned for a property that was never requested.
    pub fn empty(property_id: PropertyId) -> Self {
        Self {
            property_id,
            requester: None,
            current_owner_snapshot: None,
            pending_owner: None,
            document_references: Vec::new(),
            docs_approved: false,
            payment_reference: None,
            requested_at: 0,
            docs_approved_at: 0,
            finalized_at: 0,
            status: RequestStatus::None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Owner and request of one property, read together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyState {
    pub owner: Option<Identity>,
    pub request: Request,
}

impl PropertyState {
    pub fn empty(property_id: PropertyId) -> Self {
        Self {
            owner: None,
            request: Request::empty(property_id),
        }
    }
}

/// Workflow knobs. Document references are always stored verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Reject requests that carry no document reference. Off by default.
    pub require_documents: bool,
}
