//! Audit log replay
//!
//! Rebuilds the ledger and request store from an audit trail by folding
//! every event through [`evolve`] against empty state. Used to restore a
//! persisted engine and to cross-check live state.

use std::collections::BTreeMap;

use shared_types::{Identity, PropertyId};
use thiserror::Error;

use super::audit::{verify_chain, AuditRecord};
use super::entities::{PropertyState, Request};
use super::transitions::evolve;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("Sequence gap: expected {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },

    #[error("Hash chain broken at sequence {sequence}")]
    BrokenChain { sequence: u64 },

    #[error("Record {sequence} is not a valid transition: {reason}")]
    InvalidTransition { sequence: u64, reason: String },

    #[error("Replayed state diverges from live state: {0}")]
    Divergence(String),
}

/// Ledger and request store reconstructed from the log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayedState {
    pub owners: BTreeMap<PropertyId, Identity>,
    pub requests: BTreeMap<PropertyId, Request>,
}

pub fn replay(records: &[AuditRecord]) -> Result<ReplayedState, ReplayError> {
    verify_chain(records)?;

    let mut properties: BTreeMap<PropertyId, PropertyState> = BTreeMap::new();
    for record in records {
        let property_id = record.event.property_id();
        let state = properties
            .entry(property_id)
            .or_insert_with(|| PropertyState::empty(property_id));
        evolve(state, &record.event).map_err(|reason| ReplayError::InvalidTransition {
            sequence: record.sequence,
            reason,
        })?;
    }

    let mut replayed = ReplayedState::default();
    for (property_id, state) in properties {
        if let Some(owner) = state.owner {
            replayed.owners.insert(property_id, owner);
        }
        replayed.requests.insert(property_id, state.request);
    }
    Ok(replayed)
}
