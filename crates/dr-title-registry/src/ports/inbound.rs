//! # Inbound Port - TitleRegistryApi
//!
//! Primary driving port exposing the registry.
//!
//! ## Authorization
//!
//! | Method | Authorized Caller |
//! |--------|-------------------|
//! | `grant_role` / `revoke_role` | Admin |
//! | `request_registration` | anyone (becomes requester and pending owner) |
//! | `approve_registration_docs` / `approve_transfer_docs` | Notary |
//! | `finalize_registration` / `record_payment_and_finalize` | Registrar |
//! | `request_transfer` | current owner |
//! | queries | anyone |

use shared_types::{DocumentRef, Identity, PropertyId, Role};

use crate::domain::{AuditRecord, PropertyState, Request};
use crate::error::WorkflowResult;

/// Registry API.
///
/// Every state-changing method either commits fully (state plus its audit
/// records) or returns an error with no observable effect. On success it
/// returns the property's request as committed.
pub trait TitleRegistryApi: Send + Sync {
    // === Roles ===

    /// Returns `false` if `identity` already held `role`.
    fn grant_role(&self, caller: &Identity, identity: Identity, role: Role) -> WorkflowResult<bool>;

    /// Returns `false` if `identity` did not hold `role`.
    fn revoke_role(&self, caller: &Identity, identity: &Identity, role: Role) -> WorkflowResult<bool>;

    fn has_role(&self, identity: &Identity, role: Role) -> bool;

    // === Registration ===

    fn request_registration(
        &self,
        caller: &Identity,
        property_id: PropertyId,
        document_references: Vec<DocumentRef>,
    ) -> WorkflowResult<Request>;

    fn approve_registration_docs(&self, caller: &Identity, property_id: PropertyId) -> WorkflowResult<Request>;

    fn finalize_registration(&self, caller: &Identity, property_id: PropertyId) -> WorkflowResult<Request>;

    // === Transfer ===

    fn request_transfer(
        &self,
        caller: &Identity,
        property_id: PropertyId,
        new_owner: Identity,
        document_references: Vec<DocumentRef>,
    ) -> WorkflowResult<Request>;

    fn approve_transfer_docs(&self, caller: &Identity, property_id: PropertyId) -> WorkflowResult<Request>;

    fn record_payment_and_finalize(
        &self,
        caller: &Identity,
        property_id: PropertyId,
        payment_reference: String,
    ) -> WorkflowResult<Request>;

    // === Queries ===

    /// All request fields, with empty defaults if never requested.
    fn get_request(&self, property_id: PropertyId) -> Request;

    fn get_owner(&self, property_id: PropertyId) -> Option<Identity>;

    /// Owner and request read together under the property's lock.
    fn property(&self, property_id: PropertyId) -> PropertyState;

    fn audit_records(&self) -> Vec<AuditRecord>;

    fn audit_records_for(&self, property_id: PropertyId) -> Vec<AuditRecord>;
}
