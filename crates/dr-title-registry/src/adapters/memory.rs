//! In-memory audit sinks.

use parking_lot::Mutex;

use crate::domain::AuditRecord;
use crate::error::WorkflowResult;
use crate::ports::AuditSink;

/// Accepts every batch and stores nothing. The engine's own [`AuditLog`]
/// is then the only copy of the trail.
///
/// [`AuditLog`]: crate::domain::AuditLog
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn append(&self, _records: &[AuditRecord]) -> WorkflowResult<()> {
        Ok(())
    }
}

/// Keeps a copy of every batch it receives, in order.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    batches: Mutex<Vec<Vec<AuditRecord>>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<Vec<AuditRecord>> {
        self.batches.lock().clone()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.batches.lock().iter().flatten().cloned().collect()
    }
}

impl AuditSink for RecordingAuditSink {
    fn append(&self, records: &[AuditRecord]) -> WorkflowResult<()> {
        self.batches.lock().push(records.to_vec());
        Ok(())
    }
}
