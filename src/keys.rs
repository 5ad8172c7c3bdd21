// ABOUTME: Regenerates ~/.ssh/authorized_keys from config/ssh_keys/*.pub.
// ABOUTME: Every key is pinned to a forced command that re-enters wharf.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt, Result};
use crate::layout::Layout;
use crate::store::write_atomic_with_mode;

const KEY_OPTIONS: &str =
    "no-agent-forwarding,no-port-forwarding,no-pty,no-user-rc,no-X11-forwarding";

/// Keys found in `config/ssh_keys/*.pub`, in file name order.
///
/// Blank lines and `#` comments are skipped.
pub fn load_keys(layout: &Layout) -> Result<Vec<String>> {
    let dir = layout.ssh_keys_dir();
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).at_path(&dir),
    };

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.at_path(&dir)?.path();
        if path.extension().is_some_and(|ext| ext == "pub") && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut keys = Vec::new();
    for file in files {
        let content = fs::read_to_string(&file).at_path(&file)?;
        keys.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }
    Ok(keys)
}

/// One authorized_keys line forcing `exe` as the command for `key`.
pub fn authorized_key_line(exe: &Path, key: &str) -> String {
    format!(
        "command=\"{} $SSH_ORIGINAL_COMMAND\",{KEY_OPTIONS} {key}",
        exe.display()
    )
}

/// Rewrite `authorized_keys` atomically. Returns the number of keys written.
pub fn rebuild_authorized_keys(layout: &Layout, exe: &Path, authorized_keys: &Path) -> Result<usize> {
    let keys = load_keys(layout)?;
    let mut content = String::new();
    for key in &keys {
        content.push_str(&authorized_key_line(exe, key));
        content.push('\n');
    }

    if let Some(parent) = authorized_keys.parent() {
        fs::create_dir_all(parent).at_path(parent)?;
    }
    write_atomic_with_mode(authorized_keys, content.as_bytes(), 0o600)?;
    tracing::info!(path = %authorized_keys.display(), keys = keys.len(), "authorized_keys rebuilt");
    Ok(keys.len())
}
