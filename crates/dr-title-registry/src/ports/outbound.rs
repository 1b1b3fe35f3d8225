//! Outbound (Driven) ports for the title registry.

use std::sync::atomic::{AtomicU64, Ordering};

use shared_types::Timestamp;

use crate::domain::AuditRecord;
use crate::error::WorkflowResult;

/// Durable destination for sealed audit records.
///
/// Called while the property's key lock is held and before the records are
/// visible anywhere else. An `Err` aborts the whole operation.
pub trait AuditSink: Send + Sync {
    fn append(&self, records: &[AuditRecord]) -> WorkflowResult<()>;
}

/// Time source for request, approval and finalization timestamps.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Manually driven clock. Each call to `now` returns the current value and
/// does not advance on its own.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    time: AtomicU64,
}

impl ManualTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}
