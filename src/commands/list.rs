// ABOUTME: List command: repos, branches, runners and current checkouts.
// ABOUTME: Never writes state, so it runs without the host lock.

use wharf::error::Result;
use wharf::host::Host;

pub fn list(host: &Host) -> Result<()> {
    let repos = host.repos()?;
    if repos.is_empty() {
        host.output().warning("no repos configured");
        return Ok(());
    }

    for repo in repos {
        println!("{}:", repo.name());
        for branch in repo.branches() {
            let current = match branch.peek_current_checkout()? {
                Some(checkout) => format!("{} ({})", checkout.name(), checkout.commit().short()),
                None => "no checkout".to_string(),
            };
            let tracking = if branch.tracked_ref() == branch.name().as_str() {
                String::new()
            } else {
                format!(" [tracks {}]", branch.tracked_ref())
            };
            println!("\t{}{tracking}: {current}", branch.name());
            for runner in branch.runners() {
                println!("\t\t{} ({})", runner.name(), runner.kind());
            }
        }
    }
    Ok(())
}
