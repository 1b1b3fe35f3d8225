//! # Concurrency
//!
//! Racing callers against one property must linearize: exactly one of a set
//! of duplicate submissions wins and the others observe its post-state.
//! Unrelated properties run side by side.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};

    use dr_title_registry::{ErrorKind, RequestStatus, TitleRegistryApi, WorkflowResult};
    use shared_types::{Identity, PropertyId, Role};

    use crate::fixtures::Registry;

    const PROPERTY: PropertyId = PropertyId(42);
    const RACERS: usize = 8;

    /// Starts `RACERS` blocking tasks that all call `op` at once and returns
    /// their results.
    async fn race<F, T>(op: F) -> Vec<WorkflowResult<T>>
    where
        F: Fn(usize) -> WorkflowResult<T> + Send + Sync + 'static,
        T: Send + 'static,
    {
        let op = Arc::new(op);
        let barrier = Arc::new(Barrier::new(RACERS));
        let handles: Vec<_> = (0..RACERS)
            .map(|i| {
                let op = op.clone();
                let barrier = barrier.clone();
                tokio::task::spawn_blocking(move || {
                    barrier.wait();
                    op(i)
                })
            })
            .collect();

        let mut results = Vec::with_capacity(RACERS);
        for handle in handles {
            results.push(handle.await.expect("racer panicked"));
        }
        results
    }

    fn count_ok<T>(results: &[WorkflowResult<T>]) -> usize {
        results.iter().filter(|r| r.is_ok()).count()
    }

    fn all_losers_are<T>(results: &[WorkflowResult<T>], kind: ErrorKind) -> bool {
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|err| err.kind() == kind)
    }

    /// Grants the notary role to `RACERS` distinct identities.
    fn notaries(registry: &Registry) -> Vec<Identity> {
        (0..RACERS)
            .map(|i| {
                let notary = Identity::new(format!("notary-{i}"));
                registry
                    .engine
                    .grant_role(&registry.admin, notary.clone(), Role::Notary)
                    .unwrap();
                notary
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_duplicate_approvals_single_winner() {
        let registry = Registry::new();
        let notaries = notaries(&registry);
        registry
            .engine
            .request_registration(&Identity::new("x"), PROPERTY, vec!["doc1".into()])
            .unwrap();

        let engine = registry.engine.clone();
        let results = race(move |i| engine.approve_registration_docs(&notaries[i], PROPERTY)).await;

        assert_eq!(count_ok(&results), 1);
        assert!(all_losers_are(&results, ErrorKind::State));
        let approvals = registry
            .event_names()
            .into_iter()
            .filter(|name| *name == "DocsApproved")
            .count();
        assert_eq!(approvals, 1);
        registry.engine.verify_replay().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_duplicate_finalizations_single_winner() {
        let registry = Registry::new();
        let x = Identity::new("x");
        registry
            .engine
            .request_registration(&x, PROPERTY, vec!["doc1".into()])
            .unwrap();
        registry
            .engine
            .approve_registration_docs(&registry.notary, PROPERTY)
            .unwrap();

        let engine = registry.engine.clone();
        let registrar = registry.registrar.clone();
        let results = race(move |_| engine.finalize_registration(&registrar, PROPERTY)).await;

        assert_eq!(count_ok(&results), 1);
        assert!(all_losers_are(&results, ErrorKind::State));
        assert_eq!(registry.engine.get_owner(PROPERTY), Some(x));
        assert_eq!(registry.event_names().last(), Some(&"PropertyRegistered"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_duplicate_payments_single_transfer() {
        let registry = Registry::new();
        let x = Identity::new("x");
        let y = Identity::new("y");
        registry.register(PROPERTY, &x);
        registry.approved_transfer(PROPERTY, &x, &y);

        let engine = registry.engine.clone();
        let registrar = registry.registrar.clone();
        let results = race(move |i| {
            engine.record_payment_and_finalize(&registrar, PROPERTY, format!("pay-{i}"))
        })
        .await;

        assert_eq!(count_ok(&results), 1);
        assert!(all_losers_are(&results, ErrorKind::State));
        assert_eq!(registry.engine.get_owner(PROPERTY), Some(y));

        let transfers = registry
            .event_names()
            .into_iter()
            .filter(|name| *name == "TransferFinalized")
            .count();
        assert_eq!(transfers, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_competing_registration_requests_linearize() {
        let registry = Registry::new();
        let engine = registry.engine.clone();
        let results = race(move |i| {
            engine.request_registration(
                &Identity::new(format!("claimant-{i}")),
                PROPERTY,
                vec![format!("doc-{i}")],
            )
        })
        .await;

        // Re-submission is allowed, so every request commits in some order
        assert_eq!(count_ok(&results), RACERS);

        // The surviving request is the one whose event was appended last
        let records = registry.engine.audit_records_for(PROPERTY);
        assert_eq!(records.len(), RACERS);
        let last = &records[RACERS - 1].event;
        let request = registry.engine.get_request(PROPERTY);
        match last {
            dr_title_registry::AuditEvent::RequestCreated { requester, .. } => {
                assert_eq!(request.requester.as_ref(), Some(requester));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(request.status, RequestStatus::PendingRegistration);
        registry.engine.verify_replay().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_distinct_properties_proceed_independently() {
        const PROPERTIES: u64 = 64;
        let registry = Arc::new(Registry::new());

        let handles: Vec<_> = (0..PROPERTIES)
            .map(|id| {
                let registry = registry.clone();
                tokio::task::spawn_blocking(move || {
                    let owner = Identity::new(format!("owner-{id}"));
                    registry.register(PropertyId(id), &owner);
                    owner
                })
            })
            .collect();

        for (id, handle) in handles.into_iter().enumerate() {
            let owner = handle.await.expect("registration task panicked");
            assert_eq!(registry.engine.get_owner(PropertyId(id as u64)), Some(owner));
        }

        assert_eq!(registry.engine.ledger().len(), PROPERTIES as usize);
        assert_eq!(registry.engine.audit_log().len(), 3 * PROPERTIES as usize);

        // Interleaving across properties never reorders one property's events
        for id in 0..PROPERTIES {
            let names: Vec<_> = registry
                .engine
                .audit_records_for(PropertyId(id))
                .iter()
                .map(|r| r.event.name())
                .collect();
            assert_eq!(names, vec!["RequestCreated", "DocsApproved", "PropertyRegistered"]);
        }
        registry.engine.audit_log().verify().unwrap();
        registry.engine.verify_replay().unwrap();
    }

    #[test]
    fn test_readers_see_consistent_pairs() {
        let registry = Registry::new();
        let x = Identity::new("x");
        let y = Identity::new("y");
        registry.register(PROPERTY, &x);
        registry.approved_transfer(PROPERTY, &x, &y);

        std::thread::scope(|scope| {
            let reader = scope.spawn(|| {
                for _ in 0..1_000 {
                    let state = registry.engine.property(PROPERTY);
                    // Owner and request status always come from the same commit
                    match state.request.status {
                        RequestStatus::PendingTransfer => assert_eq!(state.owner, Some(x.clone())),
                        RequestStatus::Registered => assert_eq!(state.owner, Some(y.clone())),
                        other => panic!("unexpected status {other:?}"),
                    }
                }
            });
            registry
                .engine
                .record_payment_and_finalize(&registry.registrar, PROPERTY, "pay".into())
                .unwrap();
            reader.join().unwrap();
        });
    }
}
