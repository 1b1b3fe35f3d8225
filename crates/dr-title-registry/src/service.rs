//! Workflow Engine - the request/approval state machine
//!
//! Owns the RoleRegistry, PropertyLedger, RequestStore and AuditLog and is
//! the only code that mutates the last three.
//!
//! ## Commit Protocol
//!
//! ```text
//! lock(property) ──→ read roles ──→ snapshot(owner, request)
//!        │
//!        ├── decide(command)  ── guard failure ──→ Err, nothing written
//!        ├── evolve(staged copy) ── rule broken ──→ InvariantViolation
//!        └── audit.append ──→ sink.append ──→ write ledger + request store
//!                                  │
//!                                  └── sink error ──→ Err, nothing written
//! ```
//!
//! ## Contention
//!
//! Guard evaluation runs under the property's own lock only. The audit append
//! is the one shared critical section: sequence numbers, hash links, the sink
//! write and the state write happen under the audit log's write lock, so
//! records stay gap-free and in commit order. With a durable sink that
//! section includes the sink's fsync, which bounds commit throughput across
//! all properties. Reads and rejected operations never enter it.

use std::sync::Arc;

use parking_lot::RwLock;
use shared_types::{DocumentRef, Identity, PropertyId, Role};
use tracing::{debug, info, warn};

use crate::adapters::NullAuditSink;
use crate::domain::{
    decide, evolve, replay, AuditLog, AuditRecord, Command, KeyLocks, PropertyLedger,
    PropertyState, ReplayError, Request, RequestStore, RoleRegistry, TransitionContext,
    WorkflowConfig,
};
use crate::error::{WorkflowError, WorkflowResult};
use crate::macros::log_transition;
use crate::metrics;
use crate::ports::{AuditSink, SystemTimeSource, TimeSource, TitleRegistryApi};

/// The title registry workflow engine.
pub struct WorkflowEngine<S = NullAuditSink, T = SystemTimeSource>
where
    S: AuditSink,
    T: TimeSource,
{
    config: WorkflowConfig,
    roles: RwLock<RoleRegistry>,
    ledger: PropertyLedger,
    requests: RequestStore,
    audit: AuditLog,
    locks: KeyLocks,
    sink: Arc<S>,
    clock: Arc<T>,
}

impl WorkflowEngine<NullAuditSink, SystemTimeSource> {
    /// Engine with default limits, wall-clock time and no durable sink.
    pub fn in_memory(admin: Identity) -> Self {
        Self::new(
            WorkflowConfig::default(),
            admin,
            Arc::new(NullAuditSink),
            Arc::new(SystemTimeSource),
        )
    }
}

impl<S, T> WorkflowEngine<S, T>
where
    S: AuditSink,
    T: TimeSource,
{
    /// Creates an empty registry. `admin` is the only initial role holder.
    pub fn new(config: WorkflowConfig, admin: Identity, sink: Arc<S>, clock: Arc<T>) -> Self {
        info!(admin = %admin, "Title registry initialized");
        Self {
            config,
            roles: RwLock::new(RoleRegistry::with_admin(admin)),
            ledger: PropertyLedger::new(),
            requests: RequestStore::new(),
            audit: AuditLog::new(),
            locks: KeyLocks::new(),
            sink,
            clock,
        }
    }

    /// Rebuilds an engine from persisted role membership and audit records.
    ///
    /// The records are not re-sent to `sink`; they are assumed to already be
    /// wherever `sink` writes.
    pub fn restore(
        config: WorkflowConfig,
        roles: RoleRegistry,
        records: Vec<AuditRecord>,
        sink: Arc<S>,
        clock: Arc<T>,
    ) -> Result<Self, ReplayError> {
        let replayed = replay(&records)?;
        info!(
            records = records.len(),
            properties = replayed.requests.len(),
            owners = replayed.owners.len(),
            "Title registry restored from audit log"
        );
        Ok(Self {
            config,
            roles: RwLock::new(roles),
            ledger: PropertyLedger::from_snapshot(replayed.owners),
            requests: RequestStore::from_snapshot(replayed.requests),
            audit: AuditLog::from_records(records)?,
            locks: KeyLocks::new(),
            sink,
            clock,
        })
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Copy of the current role membership.
    pub fn roles(&self) -> RoleRegistry {
        self.roles.read().clone()
    }

    pub fn ledger(&self) -> &PropertyLedger {
        &self.ledger
    }

    pub fn requests(&self) -> &RequestStore {
        &self.requests
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Replays the audit log from empty state and compares the result with
    /// the live ledger and request store.
    pub fn verify_replay(&self) -> Result<(), ReplayError> {
        self.audit.read_with(|records| {
            let replayed = replay(records)?;
            let owners = self.ledger.snapshot();
            let requests = self.requests.snapshot();

            if replayed.owners != owners {
                return Err(ReplayError::Divergence(format!(
                    "ledger has {} owners, replay produced {}",
                    owners.len(),
                    replayed.owners.len()
                )));
            }
            if let Some((property_id, _)) = requests
                .iter()
                .find(|(id, request)| replayed.requests.get(id) != Some(request))
            {
                return Err(ReplayError::Divergence(format!(
                    "request for property {property_id} differs from replay"
                )));
            }
            if replayed.requests.len() != requests.len() {
                return Err(ReplayError::Divergence(format!(
                    "request store has {} entries, replay produced {}",
                    requests.len(),
                    replayed.requests.len()
                )));
            }
            Ok(())
        })
    }

    /// Runs one command as a single all-or-nothing unit.
    pub fn execute(
        &self,
        caller: &Identity,
        property_id: PropertyId,
        command: Command,
    ) -> WorkflowResult<Request> {
        let operation = command.name();
        self.apply(caller, property_id, command).map_err(|err| {
            log_transition!(
                warn,
                operation,
                property_id,
                caller,
                "Operation rejected",
                kind = err.kind().as_str(),
                error = %err
            );
            metrics::record_operation_rejected(operation, err.kind().as_str());
            err
        })
    }

    fn apply(&self, caller: &Identity, property_id: PropertyId, command: Command) -> WorkflowResult<Request> {
        let slot = self.locks.handle(property_id);
        let _guard = slot.lock();

        // Authorization is evaluated once; later role changes do not affect
        // an operation already past this point.
        let caller_roles = self.roles.read().roles_of(caller);

        let current = PropertyState {
            owner: self.ledger.get_owner(property_id),
            request: self.requests.get(property_id),
        };
        let ctx = TransitionContext {
            property_id,
            caller,
            caller_roles: &caller_roles,
            state: &current,
            now: self.clock.now(),
        };

        let events = decide(&ctx, &command, &self.config)?;
        debug!(
            property_id = %property_id,
            operation = command.name(),
            events = events.len(),
            "Guards passed"
        );

        let mut staged = current.clone();
        for event in &events {
            evolve(&mut staged, event).map_err(|detail| WorkflowError::InvariantViolation {
                property_id,
                detail,
            })?;
        }

        let records = self.audit.append(events, |records| {
            self.sink.append(records)?;
            if staged.owner != current.owner {
                if let Some(owner) = &staged.owner {
                    self.ledger.set_owner(property_id, owner.clone());
                }
            }
            self.requests.put(staged.request.clone());
            Ok(())
        })?;

        log_transition!(
            info,
            command.name(),
            property_id,
            caller,
            "Transition committed",
            status = ?staged.request.status,
            owner = ?staged.owner,
            first_sequence = records.first().map(|r| r.sequence)
        );
        metrics::record_transition_committed(command.name(), records.len());
        metrics::set_active_requests(self.requests.active_count());

        Ok(staged.request)
    }
}

impl<S, T> TitleRegistryApi for WorkflowEngine<S, T>
where
    S: AuditSink,
    T: TimeSource,
{
    fn grant_role(&self, caller: &Identity, identity: Identity, role: Role) -> WorkflowResult<bool> {
        let result = self.roles.write().grant_role(caller, identity.clone(), role);
        match &result {
            Ok(changed) => {
                info!(caller = %caller, identity = %identity, role = %role, changed, "Role granted");
                metrics::record_role_change("grant");
            }
            Err(err) => {
                warn!(caller = %caller, identity = %identity, role = %role, error = %err, "Role grant rejected");
                metrics::record_operation_rejected("grant_role", err.kind().as_str());
            }
        }
        result
    }

    fn revoke_role(&self, caller: &Identity, identity: &Identity, role: Role) -> WorkflowResult<bool> {
        let result = self.roles.write().revoke_role(caller, identity, role);
        match &result {
            Ok(changed) => {
                info!(caller = %caller, identity = %identity, role = %role, changed, "Role revoked");
                metrics::record_role_change("revoke");
            }
            Err(err) => {
                warn!(caller = %caller, identity = %identity, role = %role, error = %err, "Role revoke rejected");
                metrics::record_operation_rejected("revoke_role", err.kind().as_str());
            }
        }
        result
    }

    fn has_role(&self, identity: &Identity, role: Role) -> bool {
        self.roles.read().has_role(identity, role)
    }

    fn request_registration(
        &self,
        caller: &Identity,
        property_id: PropertyId,
        document_references: Vec<DocumentRef>,
    ) -> WorkflowResult<Request> {
        self.execute(
            caller,
            property_id,
            Command::RequestRegistration {
                document_references,
            },
        )
    }

    fn approve_registration_docs(&self, caller: &Identity, property_id: PropertyId) -> WorkflowResult<Request> {
        self.execute(caller, property_id, Command::ApproveRegistrationDocs)
    }

    fn finalize_registration(&self, caller: &Identity, property_id: PropertyId) -> WorkflowResult<Request> {
        self.execute(caller, property_id, Command::FinalizeRegistration)
    }

    fn request_transfer(
        &self,
        caller: &Identity,
        property_id: PropertyId,
        new_owner: Identity,
        document_references: Vec<DocumentRef>,
    ) -> WorkflowResult<Request> {
        self.execute(
            caller,
            property_id,
            Command::RequestTransfer {
                new_owner,
                document_references,
            },
        )
    }

    fn approve_transfer_docs(&self, caller: &Identity, property_id: PropertyId) -> WorkflowResult<Request> {
        self.execute(caller, property_id, Command::ApproveTransferDocs)
    }

    fn record_payment_and_finalize(
        &self,
        caller: &Identity,
        property_id: PropertyId,
        payment_reference: String,
    ) -> WorkflowResult<Request> {
        self.execute(
            caller,
            property_id,
            Command::RecordPaymentAndFinalize { payment_reference },
        )
    }

    fn get_request(&self, property_id: PropertyId) -> Request {
        self.requests.get(property_id)
    }

    fn get_owner(&self, property_id: PropertyId) -> Option<Identity> {
        self.ledger.get_owner(property_id)
    }

    fn property(&self, property_id: PropertyId) -> PropertyState {
        // Without a request record there is no owner, and the first commit
        // writes the request alone, so the unlocked read cannot tear.
        let slot = self
            .requests
            .contains(property_id)
            .then(|| self.locks.handle(property_id));
        let _guard = slot.as_ref().map(|slot| slot.lock());
        PropertyState {
            owner: self.ledger.get_owner(property_id),
            request: self.requests.get(property_id),
        }
    }

    fn audit_records(&self) -> Vec<AuditRecord> {
        self.audit.records()
    }

    fn audit_records_for(&self, property_id: PropertyId) -> Vec<AuditRecord> {
        self.audit.for_property(property_id)
    }
}
