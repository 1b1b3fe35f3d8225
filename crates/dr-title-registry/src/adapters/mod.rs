//! Adapters implementing the outbound ports.
//!
//! - `memory`: sinks that keep the log in memory only
//! - `jsonl`: append-only JSON-lines file sink

pub mod jsonl;
pub mod memory;

pub use jsonl::{AuditFileError, JsonLinesAuditSink};
pub use memory::{NullAuditSink, RecordingAuditSink};
