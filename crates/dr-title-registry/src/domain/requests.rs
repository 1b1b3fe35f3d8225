//! # Request Store
//!
//! At most one request record per property id: the live one, or the most
//! recently completed one. Re-submissions overwrite in place.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use shared_types::PropertyId;

use super::entities::Request;

#[derive(Debug, Default)]
pub struct RequestStore {
    requests: DashMap<PropertyId, Request>,
    /// Requests in PendingRegistration or PendingTransfer.
    active: AtomicUsize,
}

impl RequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request for `property_id`, or the empty default when never requested.
    pub fn get(&self, property_id: PropertyId) -> Request {
        self.requests
            .get(&property_id)
            .map(|request| request.clone())
            .unwrap_or_else(|| Request::empty(property_id))
    }

    /// True once any request was committed for `property_id`.
    pub fn contains(&self, property_id: PropertyId) -> bool {
        self.requests.contains_key(&property_id)
    }

    /// Number of requests currently in flight.
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn snapshot(&self) -> BTreeMap<PropertyId, Request> {
        self.requests
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Caller must hold the property's key lock.
    pub(crate) fn put(&self, request: Request) {
        let now_active = request.is_active();
        let was_active = self
            .requests
            .insert(request.property_id, request)
            .is_some_and(|previous| previous.is_active());
        match (was_active, now_active) {
            (false, true) => {
                self.active.fetch_add(1, Ordering::Relaxed);
            }
            (true, false) => {
                self.active.fetch_sub(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    pub(crate) fn from_snapshot(requests: BTreeMap<PropertyId, Request>) -> Self {
        let active = requests.values().filter(|request| request.is_active()).count();
        Self {
            requests: requests.into_iter().collect(),
            active: AtomicUsize::new(active),
        }
    }
}
