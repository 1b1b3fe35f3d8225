//! # Workflow Scenarios
//!
//! End-to-end walkthroughs of first registration followed by a transfer,
//! checking ledger, request fields and the exact audit order.

#[cfg(test)]
mod tests {
    use dr_title_registry::{AuditEvent, RequestStatus, TitleRegistryApi};
    use shared_types::{Identity, PropertyId};

    use crate::fixtures::Registry;

    const PROPERTY: PropertyId = PropertyId(42);

    // =============================================================================
    // REGISTRATION
    // =============================================================================

    #[test]
    fn test_registration_happy_path() {
        let registry = Registry::new();
        let x = Identity::new("x");

        let request = registry
            .engine
            .request_registration(&x, PROPERTY, vec!["doc1".into()])
            .unwrap();
        assert_eq!(request.status, RequestStatus::PendingRegistration);
        assert_eq!(request.requester, Some(x.clone()));
        assert_eq!(request.pending_owner, Some(x.clone()));
        assert_eq!(request.current_owner_snapshot, None);
        assert!(!request.docs_approved);

        registry.clock.advance(1_000);
        let request = registry
            .engine
            .approve_registration_docs(&registry.notary, PROPERTY)
            .unwrap();
        assert!(request.docs_approved);
        assert!(request.docs_approved_at > request.requested_at);
        assert_eq!(request.status, RequestStatus::PendingRegistration);

        registry.clock.advance(1_000);
        let request = registry
            .engine
            .finalize_registration(&registry.registrar, PROPERTY)
            .unwrap();
        assert_eq!(registry.engine.get_owner(PROPERTY), Some(x));
        assert_eq!(request.status, RequestStatus::Registered);
        assert!(request.finalized_at > request.docs_approved_at);

        assert_eq!(
            registry.event_names(),
            vec!["RequestCreated", "DocsApproved", "PropertyRegistered"]
        );
    }

    // =============================================================================
    // TRANSFER
    // =============================================================================

    #[test]
    fn test_transfer_happy_path() {
        let registry = Registry::new();
        let x = Identity::new("x");
        let y = Identity::new("y");
        registry.register(PROPERTY, &x);
        let registration_events = registry.engine.audit_records().len();

        let request = registry
            .engine
            .request_transfer(&x, PROPERTY, y.clone(), vec!["doc2".into()])
            .unwrap();
        assert_eq!(request.status, RequestStatus::PendingTransfer);
        assert_eq!(request.current_owner_snapshot, Some(x.clone()));
        assert_eq!(request.document_references, vec!["doc2".to_string()]);
        assert!(!request.docs_approved);

        registry
            .engine
            .approve_transfer_docs(&registry.notary, PROPERTY)
            .unwrap();
        let request = registry
            .engine
            .record_payment_and_finalize(&registry.registrar, PROPERTY, "pay-ref-1".into())
            .unwrap();

        assert_eq!(registry.engine.get_owner(PROPERTY), Some(y.clone()));
        assert_eq!(request.pending_owner, None);
        assert_eq!(request.payment_reference.as_deref(), Some("pay-ref-1"));
        assert_eq!(request.status, RequestStatus::Registered);

        let records = registry.engine.audit_records();
        let appended: Vec<_> = records[registration_events..]
            .iter()
            .map(|r| r.event.name())
            .collect();
        assert_eq!(
            appended,
            vec!["RequestCreated", "DocsApproved", "PaymentRecorded", "TransferFinalized"]
        );
        assert!(matches!(
            &records.last().unwrap().event,
            AuditEvent::TransferFinalized { from, to, .. } if *from == x && *to == y
        ));
    }

    #[test]
    fn test_new_owner_can_transfer_again() {
        let registry = Registry::new();
        let x = Identity::new("x");
        let y = Identity::new("y");
        let z = Identity::new("z");
        registry.register(PROPERTY, &x);

        registry.approved_transfer(PROPERTY, &x, &y);
        registry
            .engine
            .record_payment_and_finalize(&registry.registrar, PROPERTY, "pay-1".into())
            .unwrap();

        // The previous owner has no say any more
        assert!(registry
            .engine
            .request_transfer(&x, PROPERTY, z.clone(), vec!["doc".into()])
            .is_err());

        registry.approved_transfer(PROPERTY, &y, &z);
        registry
            .engine
            .record_payment_and_finalize(&registry.registrar, PROPERTY, "pay-2".into())
            .unwrap();
        assert_eq!(registry.engine.get_owner(PROPERTY), Some(z));
        registry.engine.verify_replay().unwrap();
    }

    #[test]
    fn test_audit_records_for_property_are_filtered() {
        let registry = Registry::new();
        registry.register(PropertyId(1), &Identity::new("a"));
        registry.register(PropertyId(2), &Identity::new("b"));

        let records = registry.engine.audit_records_for(PropertyId(2));
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.event.property_id() == PropertyId(2)));
        // Sequence numbers are global, not per property
        assert_eq!(records[0].sequence, 3);
    }
}
