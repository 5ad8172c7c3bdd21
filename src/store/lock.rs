// ABOUTME: Host-wide lock serializing every mutating wharf command.
// ABOUTME: Non-blocking flock on a single file; the kernel releases it when the process exits.

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, IoResultExt, Result};

/// Information about who holds the host lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// Command line of the holder.
    pub command: String,
}

impl LockInfo {
    /// Create lock info for the current process.
    pub fn current() -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            command: std::env::args().collect::<Vec<_>>().join(" "),
        }
    }

    /// Best-effort read of the info left in a lock file.
    pub fn read(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }
}

/// A held host lock. Dropping it unlocks.
///
/// The lock file itself is never removed: deleting it would let a later
/// process lock a fresh inode while an older one still holds the old one.
#[derive(Debug)]
pub struct HostLock {
    file: File,
    path: PathBuf,
}

impl HostLock {
    /// Try to take the lock at `path` without waiting.
    ///
    /// Fails with [`Error::Busy`] if another process holds it. In that case
    /// the lock file is left exactly as it was.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).at_path(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .at_path(path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if is_contended(&e) => {
                let holder = LockInfo::read(path);
                tracing::debug!(?holder, "host lock is held elsewhere");
                return Err(Error::Busy(holder));
            }
            Err(e) => return Err(e).at_path(path),
        }

        let lock = Self {
            file,
            path: path.to_path_buf(),
        };
        lock.record_holder()?;
        tracing::debug!(path = %lock.path.display(), "acquired host lock");
        Ok(lock)
    }

    fn record_holder(&self) -> Result<()> {
        let json = serde_json::to_string(&LockInfo::current())?;
        let mut file = &self.file;
        file.set_len(0).at_path(&self.path)?;
        file.write_all(json.as_bytes()).at_path(&self.path)?;
        file.sync_data().at_path(&self.path)?;
        Ok(())
    }
}

impl Drop for HostLock {
    fn drop(&mut self) {
        // Best effort; process exit releases the lock anyway.
        let _ = FileExt::unlock(&self.file);
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
