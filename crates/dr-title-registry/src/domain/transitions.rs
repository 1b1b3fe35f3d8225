//! State transition rules
//!
//! Two pure halves:
//!
//! - [`decide`] evaluates a [`Command`]'s guards against a snapshot of one
//!   property and returns the events the command would emit.
//! - [`evolve`] folds one event onto a [`PropertyState`].
//!
//! The engine runs both on a staged copy before committing anything, and
//! replay runs [`evolve`] alone, so live state and replayed state are
//! produced by the same code.

use std::collections::BTreeSet;

use shared_types::{DocumentRef, Identity, PaymentRef, PropertyId, Role, Timestamp};

use super::audit::AuditEvent;
use super::entities::{PropertyState, RequestStatus, WorkflowConfig};
use super::validation::{validate_documents, validate_payment_reference};
use crate::error::{WorkflowError, WorkflowResult};

/// A state-changing workflow operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RequestRegistration {
        document_references: Vec<DocumentRef>,
    },
    ApproveRegistrationDocs,
    FinalizeRegistration,
    RequestTransfer {
        new_owner: Identity,
        document_references: Vec<DocumentRef>,
    },
    ApproveTransferDocs,
    RecordPaymentAndFinalize {
        payment_reference: PaymentRef,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::RequestRegistration { .. } => "request_registration",
            Command::ApproveRegistrationDocs => "approve_registration_docs",
            Command::FinalizeRegistration => "finalize_registration",
            Command::RequestTransfer { .. } => "request_transfer",
            Command::ApproveTransferDocs => "approve_transfer_docs",
            Command::RecordPaymentAndFinalize { .. } => "record_payment_and_finalize",
        }
    }

    /// Role the caller must hold. Transfers are gated on ownership instead.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Command::RequestRegistration { .. } | Command::RequestTransfer { .. } => None,
            Command::ApproveRegistrationDocs | Command::ApproveTransferDocs => Some(Role::Notary),
            Command::FinalizeRegistration | Command::RecordPaymentAndFinalize { .. } => {
                Some(Role::Registrar)
            }
        }
    }
}

/// Everything a guard may look at.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    pub property_id: PropertyId,
    pub caller: &'a Identity,
    /// Caller's roles as of the authorization check.
    pub caller_roles: &'a BTreeSet<Role>,
    pub state: &'a PropertyState,
    pub now: Timestamp,
}

/// Evaluates guards and returns the events `command` emits on success.
pub fn decide(
    ctx: &TransitionContext<'_>,
    command: &Command,
    config: &WorkflowConfig,
) -> WorkflowResult<Vec<AuditEvent>> {
    if let Some(role) = command.required_role() {
        if !ctx.caller_roles.contains(&role) {
            return Err(WorkflowError::MissingRole {
                caller: ctx.caller.clone(),
                required: role,
            });
        }
    }

    match command {
        Command::RequestRegistration {
            document_references,
        } => request_registration(ctx, document_references, config),
        Command::ApproveRegistrationDocs => {
            approve_docs(ctx, RequestStatus::PendingRegistration, command.name())
        }
        Command::FinalizeRegistration => finalize_registration(ctx),
        Command::RequestTransfer {
            new_owner,
            document_references,
        } => request_transfer(ctx, new_owner, document_references, config),
        Command::ApproveTransferDocs => {
            approve_docs(ctx, RequestStatus::PendingTransfer, command.name())
        }
        Command::RecordPaymentAndFinalize { payment_reference } => {
            record_payment_and_finalize(ctx, payment_reference)
        }
    }
}

fn request_registration(
    ctx: &TransitionContext<'_>,
    documents: &[DocumentRef],
    config: &WorkflowConfig,
) -> WorkflowResult<Vec<AuditEvent>> {
    if ctx.state.owner.is_some() {
        return Err(WorkflowError::AlreadyRegistered {
            property_id: ctx.property_id,
        });
    }
    match ctx.state.request.status {
        RequestStatus::None | RequestStatus::PendingRegistration => {}
        RequestStatus::PendingTransfer => {
            return Err(WorkflowError::TransferPending {
                property_id: ctx.property_id,
            })
        }
        RequestStatus::Registered => {
            return Err(invariant(ctx.property_id, "status is Registered but ledger has no owner"))
        }
    }
    validate_documents(documents, config)?;

    Ok(vec![AuditEvent::RequestCreated {
        property_id: ctx.property_id,
        requester: ctx.caller.clone(),
        pending_owner: ctx.caller.clone(),
        current_owner: None,
        document_references: documents.to_vec(),
        when: ctx.now,
    }])
}

fn approve_docs(
    ctx: &TransitionContext<'_>,
    expected: RequestStatus,
    operation: &'static str,
) -> WorkflowResult<Vec<AuditEvent>> {
    let request = &ctx.state.request;
    if request.status != expected {
        return Err(WorkflowError::UnexpectedStatus {
            property_id: ctx.property_id,
            operation,
            expected,
            actual: request.status,
        });
    }
    if request.docs_approved {
        return Err(WorkflowError::DocsAlreadyApproved {
            property_id: ctx.property_id,
        });
    }

    Ok(vec![AuditEvent::DocsApproved {
        property_id: ctx.property_id,
        notary: ctx.caller.clone(),
        when: ctx.now,
    }])
}

fn finalize_registration(ctx: &TransitionContext<'_>) -> WorkflowResult<Vec<AuditEvent>> {
    let request = &ctx.state.request;
    if request.status != RequestStatus::PendingRegistration {
        return Err(WorkflowError::UnexpectedStatus {
            property_id: ctx.property_id,
            operation: "finalize_registration",
            expected: RequestStatus::PendingRegistration,
            actual: request.status,
        });
    }
    if !request.docs_approved {
        return Err(WorkflowError::DocsNotApproved {
            property_id: ctx.property_id,
        });
    }
    if let Some(owner) = &ctx.state.owner {
        return Err(invariant(
            ctx.property_id,
            format!("ledger already records owner {owner} for a pending registration"),
        ));
    }
    let owner = request
        .pending_owner
        .clone()
        .ok_or_else(|| invariant(ctx.property_id, "pending registration has no pending owner"))?;

    Ok(vec![AuditEvent::PropertyRegistered {
        property_id: ctx.property_id,
        owner,
        when: ctx.now,
    }])
}

fn request_transfer(
    ctx: &TransitionContext<'_>,
    new_owner: &Identity,
    documents: &[DocumentRef],
    config: &WorkflowConfig,
) -> WorkflowResult<Vec<AuditEvent>> {
    let owner = match &ctx.state.owner {
        Some(owner) if owner == ctx.caller => owner.clone(),
        _ => {
            return Err(WorkflowError::NotOwner {
                caller: ctx.caller.clone(),
                property_id: ctx.property_id,
            })
        }
    };

    match ctx.state.request.status {
        RequestStatus::Registered => {}
        RequestStatus::PendingTransfer => {
            return Err(WorkflowError::TransferPending {
                property_id: ctx.property_id,
            })
        }
        status => {
            return Err(invariant(
                ctx.property_id,
                format!("owned property has request status {status:?}"),
            ))
        }
    }

    if new_owner == &owner {
        return Err(WorkflowError::validation(
            "new_owner",
            "must differ from the current owner",
        ));
    }
    validate_documents(documents, config)?;

    Ok(vec![AuditEvent::RequestCreated {
        property_id: ctx.property_id,
        requester: ctx.caller.clone(),
        pending_owner: new_owner.clone(),
        current_owner: Some(owner),
        document_references: documents.to_vec(),
        when: ctx.now,
    }])
}

fn record_payment_and_finalize(
    ctx: &TransitionContext<'_>,
    payment_reference: &str,
) -> WorkflowResult<Vec<AuditEvent>> {
    let request = &ctx.state.request;
    if request.status != RequestStatus::PendingTransfer {
        return Err(WorkflowError::UnexpectedStatus {
            property_id: ctx.property_id,
            operation: "record_payment_and_finalize",
            expected: RequestStatus::PendingTransfer,
            actual: request.status,
        });
    }
    if !request.docs_approved {
        return Err(WorkflowError::DocsNotApproved {
            property_id: ctx.property_id,
        });
    }
    validate_payment_reference(payment_reference)?;

    let from = match (&ctx.state.owner, &request.current_owner_snapshot) {
        (Some(owner), Some(snapshot)) if owner == snapshot => owner.clone(),
        (owner, snapshot) => {
            return Err(invariant(
                ctx.property_id,
                format!("ledger owner {owner:?} does not match request snapshot {snapshot:?}"),
            ))
        }
    };
    let to = request
        .pending_owner
        .clone()
        .ok_or_else(|| invariant(ctx.property_id, "pending transfer has no pending owner"))?;

    Ok(vec![
        AuditEvent::PaymentRecorded {
            property_id: ctx.property_id,
            payment_reference: payment_reference.to_string(),
            when: ctx.now,
        },
        AuditEvent::TransferFinalized {
            property_id: ctx.property_id,
            from,
            to,
            when: ctx.now,
        },
    ])
}

fn invariant(property_id: PropertyId, detail: impl Into<String>) -> WorkflowError {
    WorkflowError::InvariantViolation {
        property_id,
        detail: detail.into(),
    }
}

/// Applies one event to `state`.
///
/// Returns a description of the violated rule if the event is not a legal
/// successor of `state`; `state` is left untouched in that case.
pub fn evolve(state: &mut PropertyState, event: &AuditEvent) -> Result<(), String> {
    let property_id = state.request.property_id;
    if event.property_id() != property_id {
        return Err(format!(
            "event for property {} applied to property {}",
            event.property_id(),
            property_id
        ));
    }
    let request = &state.request;

    match event {
        AuditEvent::RequestCreated {
            requester,
            pending_owner,
            current_owner,
            document_references,
            when,
            ..
        } => {
            let status = match current_owner {
                None => {
                    if state.owner.is_some() {
                        return Err("registration requested for an owned property".into());
                    }
                    if !matches!(
                        request.status,
                        RequestStatus::None | RequestStatus::PendingRegistration
                    ) {
                        return Err(format!(
                            "registration requested while {:?}",
                            request.status
                        ));
                    }
                    RequestStatus::PendingRegistration
                }
                Some(snapshot) => {
                    if state.owner.as_ref() != Some(snapshot) {
                        return Err("transfer snapshot does not match ledger owner".into());
                    }
                    if request.status == RequestStatus::PendingTransfer {
                        return Err("transfer requested while one is pending".into());
                    }
                    RequestStatus::PendingTransfer
                }
            };

            let request = &mut state.request;
            request.requester = Some(requester.clone());
            request.current_owner_snapshot = current_owner.clone();
            request.pending_owner = Some(pending_owner.clone());
            request.document_references = document_references.clone();
            request.docs_approved = false;
            request.payment_reference = None;
            request.requested_at = *when;
            request.docs_approved_at = 0;
            request.finalized_at = 0;
            request.status = status;
        }
        AuditEvent::DocsApproved { when, .. } => {
            if !request.is_active() || request.docs_approved {
                return Err(format!(
                    "docs approved while {:?} (approved: {})",
                    request.status, request.docs_approved
                ));
            }
            let request = &mut state.request;
            request.docs_approved = true;
            request.docs_approved_at = *when;
        }
        AuditEvent::PropertyRegistered { owner, when, .. } => {
            if request.status != RequestStatus::PendingRegistration || !request.docs_approved {
                return Err("registration finalized without approved pending request".into());
            }
            if state.owner.is_some() {
                return Err("registration finalized for an owned property".into());
            }
            if request.pending_owner.as_ref() != Some(owner) {
                return Err("registered owner differs from pending owner".into());
            }
            state.owner = Some(owner.clone());
            let request = &mut state.request;
            request.finalized_at = *when;
            request.status = RequestStatus::Registered;
        }
        AuditEvent::PaymentRecorded {
            payment_reference, ..
        } => {
            if request.status != RequestStatus::PendingTransfer || !request.docs_approved {
                return Err("payment recorded without approved pending transfer".into());
            }
            state.request.payment_reference = Some(payment_reference.clone());
        }
        AuditEvent::TransferFinalized { from, to, when, .. } => {
            if request.status != RequestStatus::PendingTransfer
                || !request.docs_approved
                || request.payment_reference.is_none()
            {
                return Err("transfer finalized before approval and payment".into());
            }
            if state.owner.as_ref() != Some(from)
                || request.current_owner_snapshot.as_ref() != Some(from)
            {
                return Err("transfer source differs from ledger owner".into());
            }
            if request.pending_owner.as_ref() != Some(to) {
                return Err("transfer target differs from pending owner".into());
            }
            state.owner = Some(to.clone());
            let request = &mut state.request;
            request.pending_owner = None;
            request.finalized_at = *when;
            request.status = RequestStatus::Registered;
        }
    }
    Ok(())
}
