// ABOUTME: Crash-safe file replacement.
// ABOUTME: Writes a temp file in the target directory, syncs it, then renames over the target.

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{IoResultExt, Result};

/// Replace `path` with `contents`. Readers see the old or the new file, never a mix.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    write_atomic_with_mode(path, contents, 0o644)
}

/// Like [`write_atomic`], with explicit permission bits applied before the rename.
pub fn write_atomic_with_mode(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).at_path(dir)?;

    let mut tmp = NamedTempFile::new_in(dir).at_path(dir)?;
    tmp.write_all(contents).at_path(tmp.path())?;
    tmp.as_file()
        .set_permissions(fs::Permissions::from_mode(mode))
        .at_path(tmp.path())?;
    tmp.as_file().sync_all().at_path(tmp.path())?;
    tmp.persist(path).map_err(|e| e.error).at_path(path)?;

    Ok(())
}
