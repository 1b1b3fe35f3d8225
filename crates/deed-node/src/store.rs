//! # Data Directory Store
//!
//! Layout:
//!
//! | File | Contents |
//! |------|----------|
//! | `roles.json` | `RoleRegistry` membership, rewritten after every role change |
//! | `audit.jsonl` | One `AuditRecord` per line, appended during commit |
//! | `LOCK` | Held for the duration of one command |

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dr_title_registry::{
    AuditFileError, JsonLinesAuditSink, ReplayError, RoleRegistry, SystemTimeSource,
    WorkflowConfig, WorkflowEngine,
};
use shared_types::Identity;
use thiserror::Error;
use tracing::{debug, info};

use crate::lock::{DataDirLock, LockError, DEFAULT_LOCK_TIMEOUT};

/// Engine whose audit records land in `audit.jsonl`.
pub type FileEngine = WorkflowEngine<JsonLinesAuditSink, SystemTimeSource>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Data directory {0} is already initialized")]
    AlreadyInitialized(PathBuf),

    #[error("Data directory {0} is not initialized (run `deed-node init` first)")]
    NotInitialized(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Malformed roles file {path}: {source}")]
    Roles {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Audit(#[from] AuditFileError),

    #[error("Audit log cannot be replayed: {0}")]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Lock(#[from] LockError),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// A registry data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    const ROLES_FILE: &'static str = "roles.json";
    const AUDIT_FILE: &'static str = "audit.jsonl";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn roles_path(&self) -> PathBuf {
        self.root.join(Self::ROLES_FILE)
    }

    pub fn audit_path(&self) -> PathBuf {
        self.root.join(Self::AUDIT_FILE)
    }

    pub fn is_initialized(&self) -> bool {
        self.roles_path().exists()
    }

    /// Takes the exclusive process lock, creating the directory if needed.
    pub fn lock(&self) -> Result<DataDirLock, StoreError> {
        fs::create_dir_all(&self.root).map_err(io_error(&self.root))?;
        Ok(DataDirLock::acquire(&self.root, DEFAULT_LOCK_TIMEOUT)?)
    }

    /// Creates an empty registry whose only role holder is `admin`.
    ///
    /// Caller must hold the lock.
    pub fn initialize(&self, admin: Identity) -> Result<RoleRegistry, StoreError> {
        if self.is_initialized() {
            return Err(StoreError::AlreadyInitialized(self.root.clone()));
        }
        let roles = RoleRegistry::with_admin(admin.clone());
        self.save_roles(&roles)?;
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.audit_path())
            .map_err(io_error(&self.audit_path()))?;
        info!(data_dir = %self.root.display(), admin = %admin, "Data directory initialized");
        Ok(roles)
    }

    pub fn load_roles(&self) -> Result<RoleRegistry, StoreError> {
        let path = self.roles_path();
        if !path.exists() {
            return Err(StoreError::NotInitialized(self.root.clone()));
        }
        let bytes = fs::read(&path).map_err(io_error(&path))?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Roles { path, source })
    }

    /// Replaces `roles.json` via write-to-temp and rename.
    pub fn save_roles(&self, roles: &RoleRegistry) -> Result<(), StoreError> {
        let path = self.roles_path();
        let tmp = self.root.join(format!("{}.tmp", Self::ROLES_FILE));
        let bytes = serde_json::to_vec_pretty(roles).map_err(|source| StoreError::Roles {
            path: path.clone(),
            source,
        })?;

        let mut file = fs::File::create(&tmp).map_err(io_error(&tmp))?;
        file.write_all(&bytes).map_err(io_error(&tmp))?;
        file.sync_all().map_err(io_error(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_error(&path))?;
        debug!(path = %path.display(), members = roles.membership().len(), "Roles saved");
        Ok(())
    }

    /// Restores the engine from disk. New records are appended to
    /// `audit.jsonl` as operations commit.
    ///
    /// Caller must hold the lock.
    pub fn open_engine(&self, config: WorkflowConfig) -> Result<FileEngine, StoreError> {
        let roles = self.load_roles()?;
        let records = JsonLinesAuditSink::read_records(self.audit_path())?;
        let sink = JsonLinesAuditSink::open(self.audit_path())?;
        let engine = WorkflowEngine::restore(
            config,
            roles,
            records,
            Arc::new(sink),
            Arc::new(SystemTimeSource),
        )?;
        Ok(engine)
    }
}
