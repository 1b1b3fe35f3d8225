//! # Persistence and Replay
//!
//! The audit log is the externally consumable history: replaying it against
//! empty state must rebuild the ledger and request store exactly, both in
//! memory and through a `deed-node` data directory.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use deed_node::{DataDir, StoreError};
    use dr_title_registry::{
        replay, JsonLinesAuditSink, ManualTimeSource, NullAuditSink, ReplayError, RequestStatus,
        TitleRegistryApi, WorkflowConfig, WorkflowEngine,
    };
    use shared_types::{Identity, PropertyId, Role};
    use tempfile::TempDir;

    use crate::fixtures::Registry;

    /// A registry with properties in every reachable status.
    fn busy_registry() -> Registry {
        let registry = Registry::new();
        let alice = Identity::new("alice");
        let bob = Identity::new("bob");

        // 1: transferred, 2: registered, 3: transfer pending, 4: registration pending
        registry.register(PropertyId(1), &alice);
        registry.approved_transfer(PropertyId(1), &alice, &bob);
        registry
            .engine
            .record_payment_and_finalize(&registry.registrar, PropertyId(1), "wire-1".into())
            .unwrap();
        registry.register(PropertyId(2), &bob);
        registry.register(PropertyId(3), &alice);
        registry
            .engine
            .request_transfer(&alice, PropertyId(3), bob.clone(), vec!["contract-3".into()])
            .unwrap();
        registry
            .engine
            .request_registration(&bob, PropertyId(4), vec!["scan-4a".into(), "scan-4b".into()])
            .unwrap();
        registry
    }

    #[test]
    fn test_replay_reconstructs_exact_state() {
        let registry = busy_registry();
        let replayed = replay(&registry.engine.audit_records()).unwrap();

        assert_eq!(replayed.owners, registry.engine.ledger().snapshot());
        assert_eq!(replayed.requests, registry.engine.requests().snapshot());
        assert_eq!(
            replayed.requests[&PropertyId(3)].status,
            RequestStatus::PendingTransfer
        );
        assert_eq!(
            replayed.requests[&PropertyId(4)].document_references,
            vec!["scan-4a".to_string(), "scan-4b".to_string()]
        );
    }

    #[test]
    fn test_replay_rejects_reordered_log() {
        let registry = busy_registry();
        let mut records = registry.engine.audit_records();
        records.swap(1, 2);
        assert!(matches!(
            replay(&records),
            Err(ReplayError::SequenceGap { .. })
        ));
    }

    #[test]
    fn test_replay_rejects_truncated_prefix() {
        let registry = busy_registry();
        let records = registry.engine.audit_records();
        assert!(replay(&records[1..]).is_err());
    }

    #[test]
    fn test_restored_engine_continues_workflow() {
        let registry = busy_registry();
        let restored = WorkflowEngine::restore(
            WorkflowConfig::default(),
            registry.engine.roles(),
            registry.engine.audit_records(),
            Arc::new(NullAuditSink),
            Arc::new(ManualTimeSource::new(1_800_000_000_000)),
        )
        .unwrap();

        restored
            .approve_transfer_docs(&registry.notary, PropertyId(3))
            .unwrap();
        restored
            .record_payment_and_finalize(&registry.registrar, PropertyId(3), "wire-3".into())
            .unwrap();
        assert_eq!(restored.get_owner(PropertyId(3)), Some(Identity::new("bob")));

        restored.audit_log().verify().unwrap();
        restored.verify_replay().unwrap();
        // The original engine is unaffected
        assert_eq!(
            registry.engine.get_request(PropertyId(3)).status,
            RequestStatus::PendingTransfer
        );
    }

    #[test]
    fn test_data_dir_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = DataDir::new(dir.path());
        let admin = Identity::new("admin");
        let notary = Identity::new("notary");
        let registrar = Identity::new("registrar");
        let owner = Identity::new("owner");

        {
            let _lock = store.lock().unwrap();
            store.initialize(admin.clone()).unwrap();
            let engine = store.open_engine(WorkflowConfig::default()).unwrap();
            engine.grant_role(&admin, notary.clone(), Role::Notary).unwrap();
            engine
                .grant_role(&admin, registrar.clone(), Role::Registrar)
                .unwrap();
            store.save_roles(&engine.roles()).unwrap();

            engine
                .request_registration(&owner, PropertyId(10), vec!["doc".into()])
                .unwrap();
            engine.approve_registration_docs(&notary, PropertyId(10)).unwrap();
        }

        // A later process picks up where the first left off
        let _lock = store.lock().unwrap();
        let engine = store.open_engine(WorkflowConfig::default()).unwrap();
        engine.finalize_registration(&registrar, PropertyId(10)).unwrap();
        assert_eq!(engine.get_owner(PropertyId(10)), Some(owner));

        let on_disk = JsonLinesAuditSink::read_records(store.audit_path()).unwrap();
        assert_eq!(on_disk, engine.audit_records());
        assert_eq!(replay(&on_disk).unwrap().owners, engine.ledger().snapshot());
    }

    #[test]
    fn test_rejected_operation_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let store = DataDir::new(dir.path());
        let admin = Identity::new("admin");
        store.initialize(admin).unwrap();

        let engine = store.open_engine(WorkflowConfig::default()).unwrap();
        engine
            .request_registration(&Identity::new("x"), PropertyId(5), vec!["doc".into()])
            .unwrap();
        let before = std::fs::read(store.audit_path()).unwrap();

        assert!(engine
            .finalize_registration(&Identity::new("nobody"), PropertyId(5))
            .is_err());
        assert_eq!(std::fs::read(store.audit_path()).unwrap(), before);
    }

    #[test]
    fn test_edited_history_refused_on_open() {
        let dir = TempDir::new().unwrap();
        let store = DataDir::new(dir.path());
        let admin = Identity::new("admin");
        store.initialize(admin.clone()).unwrap();
        {
            let engine = store.open_engine(WorkflowConfig::default()).unwrap();
            engine
                .grant_role(&admin, Identity::new("notary"), Role::Notary)
                .unwrap();
            store.save_roles(&engine.roles()).unwrap();
            engine
                .request_registration(&Identity::new("x"), PropertyId(5), vec!["doc".into()])
                .unwrap();
            engine
                .approve_registration_docs(&Identity::new("notary"), PropertyId(5))
                .unwrap();
        }

        // Drop the approval line: the chain is still intact but the approval
        // never happened, so a later finalize must fail cleanly
        let contents = std::fs::read_to_string(store.audit_path()).unwrap();
        let first_line: String = contents.lines().take(1).map(|l| format!("{l}\n")).collect();
        std::fs::write(store.audit_path(), first_line).unwrap();
        let engine = store.open_engine(WorkflowConfig::default()).unwrap();
        assert!(!engine.get_request(PropertyId(5)).docs_approved);

        // Rewriting a committed field breaks the hash chain
        let tampered = contents.replacen("\"x\"", "\"mallory\"", 1);
        std::fs::write(store.audit_path(), tampered).unwrap();
        assert!(matches!(
            store.open_engine(WorkflowConfig::default()),
            Err(StoreError::Replay(ReplayError::BrokenChain { sequence: 0 }))
        ));
    }
}
