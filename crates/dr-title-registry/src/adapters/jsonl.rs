//! # JSON-Lines Audit Sink
//!
//! One `serde_json` object per line, one `write_all` + `sync_data` per batch.
//! A batch that fails half-way is truncated back to the previous length so
//! the file never holds records the engine did not commit.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, error};

use crate::domain::AuditRecord;
use crate::error::{WorkflowError, WorkflowResult};
use crate::ports::AuditSink;

/// Errors reading an audit file back.
#[derive(Debug, Error)]
pub enum AuditFileError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed audit record at {path}:{line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug)]
pub struct JsonLinesAuditSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesAuditSink {
    /// Opens (or creates) `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditFileError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AuditFileError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record in `path`. A missing file is an empty log.
    pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<AuditRecord>, AuditFileError> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(AuditFileError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| AuditFileError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| AuditFileError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
                source,
            })?;
            records.push(record);
        }
        Ok(records)
    }

    fn write_batch(file: &mut File, records: &[AuditRecord]) -> io::Result<()> {
        let mut buf = Vec::with_capacity(records.len() * 256);
        for record in records {
            serde_json::to_writer(&mut buf, record)?;
            buf.push(b'\n');
        }
        file.write_all(&buf)?;
        file.flush()?;
        file.sync_data()
    }
}

impl AuditSink for JsonLinesAuditSink {
    fn append(&self, records: &[AuditRecord]) -> WorkflowResult<()> {
        let mut file = self.file.lock();
        let original_len = file
            .metadata()
            .map_err(|e| WorkflowError::Storage(e.to_string()))?
            .len();

        if let Err(e) = Self::write_batch(&mut file, records) {
            error!(path = %self.path.display(), error = %e, "Audit append failed, truncating");
            if let Err(truncate_err) = file.set_len(original_len) {
                error!(error = %truncate_err, "Failed to truncate partial audit batch");
            }
            return Err(WorkflowError::Storage(e.to_string()));
        }

        debug!(path = %self.path.display(), count = records.len(), "Audit batch persisted");
        Ok(())
    }
}
