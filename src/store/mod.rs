// ABOUTME: Persisted host state: active-checkout pointers, maintenance markers, host lock.
// ABOUTME: The only interface the deploy state machine uses to read or write shared state.

mod atomic;
mod lock;

pub use atomic::{write_atomic, write_atomic_with_mode};
pub use lock::{HostLock, LockInfo};

use std::fs;
use std::io;

use crate::error::{IoResultExt, Result};
use crate::layout::Layout;
use crate::types::{BranchName, CheckoutName, RepoName};

/// File-backed state store rooted at a [`Layout`].
///
/// Writers must hold the [`HostLock`]; readers may not, and therefore
/// tolerate missing or stale files.
#[derive(Debug, Clone)]
pub struct StateStore {
    layout: Layout,
}

impl StateStore {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Take the host lock, failing immediately if it is held.
    pub fn lock(&self) -> Result<HostLock> {
        HostLock::acquire(&self.layout.lock_file())
    }

    /// Raw content of the active-checkout pointer, if any.
    ///
    /// Unreadable pointers are reported as absent.
    pub fn active_checkout(&self, repo: &RepoName, branch: &BranchName) -> Option<String> {
        let path = self.layout.pointer_file(repo, branch);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content.trim().to_string()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable checkout pointer");
                None
            }
        }
    }

    /// Atomically point the branch at `name`.
    pub fn set_active_checkout(
        &self,
        repo: &RepoName,
        branch: &BranchName,
        name: &CheckoutName,
    ) -> Result<()> {
        write_atomic(
            &self.layout.pointer_file(repo, branch),
            name.as_str().as_bytes(),
        )
    }

    pub fn clear_active_checkout(&self, repo: &RepoName, branch: &BranchName) -> Result<()> {
        remove_if_present(&self.layout.pointer_file(repo, branch))
    }

    pub fn in_maintenance(&self, repo: &RepoName, branch: &BranchName) -> bool {
        self.layout.maintenance_marker(repo, branch).exists()
    }

    pub fn set_maintenance(&self, repo: &RepoName, branch: &BranchName, on: bool) -> Result<()> {
        let marker = self.layout.maintenance_marker(repo, branch);
        if on {
            write_atomic(&marker, b"")
        } else {
            remove_if_present(&marker)
        }
    }
}

fn remove_if_present(path: &std::path::Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other.at_path(path),
    }
}
