//! Shared test fixtures.

use std::sync::Arc;

use dr_title_registry::{
    AuditRecord, ManualTimeSource, NullAuditSink, TitleRegistryApi, WorkflowConfig,
    WorkflowEngine,
};
use shared_types::{Identity, PropertyId, Role};

pub type TestEngine = WorkflowEngine<NullAuditSink, ManualTimeSource>;

/// Engine plus the three staff identities, with roles already granted.
pub struct Registry {
    pub engine: Arc<TestEngine>,
    pub clock: Arc<ManualTimeSource>,
    pub admin: Identity,
    pub notary: Identity,
    pub registrar: Identity,
}

impl Registry {
    pub fn new() -> Self {
        let clock = Arc::new(ManualTimeSource::new(1_700_000_000_000));
        let admin = Identity::new("admin");
        let notary = Identity::new("notary-n");
        let registrar = Identity::new("registrar-r");

        let engine = WorkflowEngine::new(
            WorkflowConfig::default(),
            admin.clone(),
            Arc::new(NullAuditSink),
            clock.clone(),
        );
        engine
            .grant_role(&admin, notary.clone(), Role::Notary)
            .expect("admin grants notary");
        engine
            .grant_role(&admin, registrar.clone(), Role::Registrar)
            .expect("admin grants registrar");

        Self {
            engine: Arc::new(engine),
            clock,
            admin,
            notary,
            registrar,
        }
    }

    /// Takes `property_id` through a complete registration for `owner`.
    pub fn register(&self, property_id: PropertyId, owner: &Identity) {
        self.engine
            .request_registration(owner, property_id, vec![format!("deed-{property_id}")])
            .expect("request registration");
        self.engine
            .approve_registration_docs(&self.notary, property_id)
            .expect("approve registration docs");
        self.engine
            .finalize_registration(&self.registrar, property_id)
            .expect("finalize registration");
    }

    /// Opens a transfer to `new_owner` and approves its documents.
    pub fn approved_transfer(&self, property_id: PropertyId, owner: &Identity, new_owner: &Identity) {
        self.engine
            .request_transfer(owner, property_id, new_owner.clone(), vec!["contract".into()])
            .expect("request transfer");
        self.engine
            .approve_transfer_docs(&self.notary, property_id)
            .expect("approve transfer docs");
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        event_names(&self.engine.audit_records())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

pub fn event_names(records: &[AuditRecord]) -> Vec<&'static str> {
    records.iter().map(|r| r.event.name()).collect()
}
