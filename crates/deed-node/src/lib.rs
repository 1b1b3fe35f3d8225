//! # Deed Node
//!
//! File-backed runtime for the title registry.
//!
//! ## Modular Structure
//!
//! - `config` - Data directory and workflow limits
//! - `lock` - Exclusive process lock on the data directory
//! - `store` - `roles.json` + `audit.jsonl` persistence and engine restore
//! - `cli` - Command-line surface, one subcommand per registry operation
//!
//! ## Command Lifecycle
//!
//! ```text
//! acquire LOCK ──→ read roles.json + audit.jsonl ──→ replay into engine
//!                                                         │
//!                                     run one operation ──┤
//!                                                         │
//!          audit.jsonl appended by the sink during commit ┤
//!                         roles.json rewritten on change ─┘
//! release LOCK (drop)
//! ```

pub mod cli;
pub mod config;
pub mod lock;
pub mod store;

pub use cli::{execute, Cli, NodeCommand};
pub use config::NodeConfig;
pub use lock::{DataDirLock, LockError};
pub use store::{DataDir, FileEngine, StoreError};
