//! # Property Ledger
//!
//! Durable property-id → owner mapping. There is no public `set_owner`:
//! ownership changes only through the workflow engine's finalize steps.

use std::collections::BTreeMap;

use dashmap::DashMap;
use shared_types::{Identity, PropertyId};

/// Current ownership of every registered property.
#[derive(Debug, Default)]
pub struct PropertyLedger {
    owners: DashMap<PropertyId, Identity>,
}

impl PropertyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owner of `property_id`; `None` means never registered.
    pub fn get_owner(&self, property_id: PropertyId) -> Option<Identity> {
        self.owners.get(&property_id).map(|owner| owner.clone())
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Sorted copy of the whole ledger.
    pub fn snapshot(&self) -> BTreeMap<PropertyId, Identity> {
        self.owners
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Caller must hold the property's key lock.
    pub(crate) fn set_owner(&self, property_id: PropertyId, owner: Identity) {
        self.owners.insert(property_id, owner);
    }

    pub(crate) fn from_snapshot(owners: BTreeMap<PropertyId, Identity>) -> Self {
        Self {
            owners: owners.into_iter().collect(),
        }
    }
}
