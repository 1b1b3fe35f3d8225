//! # Audit Log
//!
//! Append-only, strictly ordered record of every committed transition.
//!
//! ## Record Chain
//!
//! ```text
//! GENESIS_HASH ──→ [seq 0] ──hash──→ [seq 1] ──hash──→ [seq 2] ...
//! hash = SHA-256(prev_hash || sequence_be || json(event))
//! ```
//!
//! External consumers read the log; only the workflow engine appends to it,
//! in the same atomic unit as the state mutation the event describes.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{DocumentRef, Identity, PaymentRef, PropertyId, Timestamp};

use super::replay::ReplayError;
use crate::error::{WorkflowError, WorkflowResult};

/// `prev_hash` of the first record.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// A committed state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Registration or transfer request submitted (or re-submitted).
    RequestCreated {
        property_id: PropertyId,
        requester: Identity,
        pending_owner: Identity,
        /// Owner snapshot; `None` for first registration.
        current_owner: Option<Identity>,
        document_references: Vec<DocumentRef>,
        when: Timestamp,
    },
    DocsApproved {
        property_id: PropertyId,
        notary: Identity,
        when: Timestamp,
    },
    PaymentRecorded {
        property_id: PropertyId,
        payment_reference: PaymentRef,
        when: Timestamp,
    },
    TransferFinalized {
        property_id: PropertyId,
        from: Identity,
        to: Identity,
        when: Timestamp,
    },
    PropertyRegistered {
        property_id: PropertyId,
        owner: Identity,
        when: Timestamp,
    },
}

impl AuditEvent {
    pub fn property_id(&self) -> PropertyId {
        match self {
            AuditEvent::RequestCreated { property_id, .. }
            | AuditEvent::DocsApproved { property_id, .. }
            | AuditEvent::PaymentRecorded { property_id, .. }
            | AuditEvent::TransferFinalized { property_id, .. }
            | AuditEvent::PropertyRegistered { property_id, .. } => *property_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuditEvent::RequestCreated { .. } => "RequestCreated",
            AuditEvent::DocsApproved { .. } => "DocsApproved",
            AuditEvent::PaymentRecorded { .. } => "PaymentRecorded",
            AuditEvent::TransferFinalized { .. } => "TransferFinalized",
            AuditEvent::PropertyRegistered { .. } => "PropertyRegistered",
        }
    }

    pub fn when(&self) -> Timestamp {
        match self {
            AuditEvent::RequestCreated { when, .. }
            | AuditEvent::DocsApproved { when, .. }
            | AuditEvent::PaymentRecorded { when, .. }
            | AuditEvent::TransferFinalized { when, .. }
            | AuditEvent::PropertyRegistered { when, .. } => *when,
        }
    }
}

/// An event sealed into the log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Position in the log, starting at 0 with no gaps.
    pub sequence: u64,
    pub event: AuditEvent,
    /// Hex hash of the preceding record ([`GENESIS_HASH`] for sequence 0).
    pub prev_hash: String,
    /// Hex SHA-256 over `prev_hash`, `sequence` and the event.
    pub hash: String,
}

impl AuditRecord {
    pub fn seal(sequence: u64, prev_hash: String, event: AuditEvent) -> Result<Self, serde_json::Error> {
        let hash = record_hash(&prev_hash, sequence, &event)?;
        Ok(Self {
            sequence,
            event,
            prev_hash,
            hash,
        })
    }

    /// Recomputes the hash and compares it with the stored one.
    pub fn is_intact(&self) -> bool {
        record_hash(&self.prev_hash, self.sequence, &self.event)
            .map(|hash| hash == self.hash)
            .unwrap_or(false)
    }
}

fn record_hash(prev_hash: &str, sequence: u64, event: &AuditEvent) -> Result<String, serde_json::Error> {
    let payload = serde_json::to_vec(event)?;
    let mut hasher = Sha256::new();
    hasher.update(prev_hash.as_bytes());
    hasher.update(sequence.to_be_bytes());
    hasher.update(&payload);
    Ok(hex::encode(hasher.finalize()))
}

/// Checks sequence continuity and hash linkage of a record slice that starts
/// at sequence 0.
pub fn verify_chain(records: &[AuditRecord]) -> Result<(), ReplayError> {
    let mut prev_hash = GENESIS_HASH;
    for (expected, record) in (0u64..).zip(records) {
        if record.sequence != expected {
            return Err(ReplayError::SequenceGap {
                expected,
                found: record.sequence,
            });
        }
        if record.prev_hash != prev_hash || !record.is_intact() {
            return Err(ReplayError::BrokenChain {
                sequence: record.sequence,
            });
        }
        prev_hash = record.hash.as_str();
    }
    Ok(())
}

/// In-memory, read-mostly view of the audit trail.
#[derive(Debug, Default)]
pub struct AuditLog {
    records: RwLock<Vec<AuditRecord>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts previously persisted records after verifying their chain.
    pub fn from_records(records: Vec<AuditRecord>) -> Result<Self, ReplayError> {
        verify_chain(&records)?;
        Ok(Self {
            records: RwLock::new(records),
        })
    }

    /// Seals `events` in order, hands them to `persist`, and only then makes
    /// them visible. If `persist` fails nothing is appended.
    ///
    /// `persist` runs under the log's write lock, so anything it writes is
    /// observed together with the records by [`AuditLog::read_with`]. A slow
    /// `persist` (an fsync) therefore delays commits on every property.
    pub(crate) fn append<F>(&self, events: Vec<AuditEvent>, persist: F) -> WorkflowResult<Vec<AuditRecord>>
    where
        F: FnOnce(&[AuditRecord]) -> WorkflowResult<()>,
    {
        let mut records = self.records.write();
        let mut next_sequence = records.len() as u64;
        let mut prev_hash = records
            .last()
            .map(|record| record.hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string());

        let mut sealed = Vec::with_capacity(events.len());
        for event in events {
            let record = AuditRecord::seal(next_sequence, prev_hash, event)
                .map_err(|e| WorkflowError::Storage(e.to_string()))?;
            prev_hash = record.hash.clone();
            next_sequence += 1;
            sealed.push(record);
        }

        persist(&sealed)?;
        records.extend(sealed.iter().cloned());
        Ok(sealed)
    }

    /// Runs `f` over the records while holding the read lock.
    pub fn read_with<R>(&self, f: impl FnOnce(&[AuditRecord]) -> R) -> R {
        f(&self.records.read())
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Copy of the full log.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.read().clone()
    }

    /// Records with `sequence >= from`.
    pub fn since(&self, from: u64) -> Vec<AuditRecord> {
        let records = self.records.read();
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(records.len());
        records[start..].to_vec()
    }

    pub fn for_property(&self, property_id: PropertyId) -> Vec<AuditRecord> {
        self.records
            .read()
            .iter()
            .filter(|record| record.event.property_id() == property_id)
            .cloned()
            .collect()
    }

    /// Hash of the newest record, or [`GENESIS_HASH`] when empty.
    pub fn head_hash(&self) -> String {
        self.records
            .read()
            .last()
            .map(|record| record.hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string())
    }

    pub fn verify(&self) -> Result<(), ReplayError> {
        verify_chain(&self.records.read())
    }
}
