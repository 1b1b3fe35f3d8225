//! # Per-Property Locks
//!
//! Serializes workflow operations per property id. Operations on different
//! ids take different mutexes and never wait on each other.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use shared_types::PropertyId;

/// Lazily populated table of one mutex per property id.
#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: DashMap<PropertyId, Arc<Mutex<()>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutex guarding `property_id`. Lock the returned handle for the whole
    /// guard-check-then-commit sequence.
    pub fn handle(&self, property_id: PropertyId) -> Arc<Mutex<()>> {
        self.locks.entry(property_id).or_default().clone()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
