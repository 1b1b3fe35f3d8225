//! # dr-title-registry
//!
//! Property title registry with a role-gated registration and transfer
//! workflow and an append-only, hash-chained audit trail.
//!
//! ## Overview
//!
//! This crate provides:
//! - **Roles**: Admin, Notary and Registrar membership, managed by admins
//! - **Ledger**: the authoritative property → owner mapping
//! - **Workflow**: at most one live request per property, driven through
//!   documentation approval and finalization
//! - **Audit Trail**: every committed transition appends records; replaying
//!   them from empty state reproduces ledger and request store
//!
//! ## Request Lifecycle
//!
//! ```text
//!             request_registration                   finalize_registration
//! [NONE] ──────────────────────────→ [PENDING_REGISTRATION] ──────────────────→ [REGISTERED]
//!                                      │  approve_registration_docs                │  ↑
//!                                      └── docs_approved = true                     │  │
//!                                                                 request_transfer │  │ record_payment_and_finalize
//!                                                                                   ↓  │
//!                                                                          [PENDING_TRANSFER]
//!                                                                            │ approve_transfer_docs
//!                                                                            └── docs_approved = true
//! ```
//!
//! ## Authorization
//!
//! | Operation | Required |
//! |-----------|----------|
//! | grant_role / revoke_role | Admin |
//! | request_registration | any identity |
//! | approve_registration_docs / approve_transfer_docs | Notary |
//! | finalize_registration / record_payment_and_finalize | Registrar |
//! | request_transfer | current owner |
//!
//! ## Audit Events
//!
//! | Operation | Events (in order) |
//! |-----------|-------------------|
//! | request_registration / request_transfer | RequestCreated |
//! | approve_*_docs | DocsApproved |
//! | finalize_registration | PropertyRegistered |
//! | record_payment_and_finalize | PaymentRecorded, TransferFinalized |
//!
//! ## Example
//!
//! ```rust,ignore
//! use dr_title_registry::{TitleRegistryApi, WorkflowEngine};
//! use shared_types::{Identity, PropertyId, Role};
//!
//! let admin = Identity::new("admin");
//! let engine = WorkflowEngine::in_memory(admin.clone());
//! engine.grant_role(&admin, Identity::new("notary"), Role::Notary)?;
//!
//! let request = engine.request_registration(
//!     &Identity::new("alice"),
//!     PropertyId(42),
//!     vec!["deed-scan-001".into()],
//! )?;
//! ```

mod macros;

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{AuditFileError, JsonLinesAuditSink, NullAuditSink, RecordingAuditSink};
pub use domain::{
    replay, verify_chain, AuditEvent, AuditLog, AuditRecord, Command, PropertyLedger,
    PropertyState, ReplayError, ReplayedState, Request, RequestStatus, RequestStore,
    RoleRegistry, WorkflowConfig, GENESIS_HASH,
};
pub use error::{ErrorKind, WorkflowError, WorkflowResult};
pub use ports::inbound::TitleRegistryApi;
pub use ports::outbound::{AuditSink, ManualTimeSource, SystemTimeSource, TimeSource};
pub use service::WorkflowEngine;
