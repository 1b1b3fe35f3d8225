//! # Data Directory Locking
//!
//! Prevents two `deed-node` processes from interleaving writes to the same
//! audit file. Uses `fs2` for cross-platform file locking (flock on Unix,
//! LockFile on Windows).

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use thiserror::Error;

/// How long `acquire` waits for another process to finish.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from data directory locking
#[derive(Debug, Error)]
pub enum LockError {
    #[error("Failed to create lock file {path}: {source}")]
    CreateFailed { path: PathBuf, source: io::Error },

    #[error("Data directory already in use{} ({})", held_by(.pid), .path.display())]
    AlreadyLocked { pid: Option<u32>, path: PathBuf },

    #[error("Failed to write PID to lock file: {0}")]
    WriteFailed(io::Error),
}

fn held_by(pid: &Option<u32>) -> String {
    pid.map(|p| format!(" by process {p}")).unwrap_or_default()
}

/// Exclusive lock on a data directory, released on drop.
///
/// ```ignore
/// let lock = DataDirLock::acquire(Path::new("./deed-data"), DEFAULT_LOCK_TIMEOUT)?;
/// // Lock is held until `lock` goes out of scope
/// ```
#[derive(Debug)]
pub struct DataDirLock {
    file: File,
    path: PathBuf,
    pid: u32,
}

impl DataDirLock {
    const LOCK_FILE: &'static str = "LOCK";

    /// Acquires the lock, retrying with exponential backoff until `timeout`.
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let deadline = Instant::now() + timeout;
        let lock_path = data_dir.join(Self::LOCK_FILE);
        let mut retry_delay = Duration::from_millis(20);

        loop {
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(&lock_path)
                .map_err(|source| LockError::CreateFailed {
                    path: lock_path.clone(),
                    source,
                })?;

            match file.try_lock_exclusive() {
                Ok(()) => {
                    let pid = std::process::id();
                    let mut locked_file = file;
                    locked_file.set_len(0).map_err(LockError::WriteFailed)?;
                    writeln!(locked_file, "{pid}").map_err(LockError::WriteFailed)?;
                    locked_file.sync_all().map_err(LockError::WriteFailed)?;

                    tracing::debug!(path = %lock_path.display(), pid, "Data directory locked");
                    return Ok(Self {
                        file: locked_file,
                        path: lock_path,
                        pid,
                    });
                }
                Err(_) => {
                    if Instant::now() >= deadline {
                        return Err(LockError::AlreadyLocked {
                            pid: Self::read_existing_pid(&lock_path),
                            path: lock_path,
                        });
                    }
                    drop(file);
                    std::thread::sleep(retry_delay);
                    retry_delay = (retry_delay * 2).min(Duration::from_millis(250));
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    fn read_existing_pid(path: &Path) -> Option<u32> {
        let mut contents = String::new();
        File::open(path).ok()?.read_to_string(&mut contents).ok()?;
        contents.trim().parse().ok()
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        // The file itself stays; only the advisory lock is released.
        let _ = FileExt::unlock(&self.file);
    }
}
