// ABOUTME: Rebuilds the SSH authorized_keys file from config/ssh_keys.
// ABOUTME: Keys are pinned to this executable as a forced command.

use std::path::Path;
use wharf::error::Result;
use wharf::host::Host;
use wharf::keys;

pub fn rebuild_authorized_keys(host: &Host, exe: &Path, authorized_keys: &Path) -> Result<()> {
    let _lock = host.lock()?;
    let count = keys::rebuild_authorized_keys(host.layout(), exe, authorized_keys)?;
    host.output().success(&format!(
        "✓ Wrote {count} key(s) to {}",
        authorized_keys.display()
    ));
    Ok(())
}
