// ABOUTME: Rebuild command: redeploys the current commit of one or all branches.
// ABOUTME: Branches that were never deployed are skipped.

use wharf::branch::Branch;
use wharf::error::Result;
use wharf::host::Host;
use wharf::types::{BranchName, RepoName};

pub async fn rebuild(host: &Host, repo: Option<&str>, branch: Option<&str>) -> Result<()> {
    let _lock = host.lock()?;

    let branches: Vec<Branch> = match (repo, branch) {
        (Some(repo), Some(branch)) => {
            let repo = host.repo(&RepoName::from_ssh_arg(repo)?)?;
            vec![repo.branch(&BranchName::new(branch.trim_matches('\''))?)?]
        }
        _ => host
            .repos()?
            .iter()
            .flat_map(|repo| repo.branches())
            .collect(),
    };

    let output = host.output();
    for branch in &branches {
        let Some(current) = branch.current_checkout()? else {
            output.progress(&format!(
                "{}:{} has no checkout. Skipping...",
                branch.repo(),
                branch.name()
            ));
            continue;
        };

        output.progress(&format!(
            "Rebuilding {}:{} at {}",
            branch.repo(),
            branch.name(),
            current.commit().short()
        ));
        let checkout = branch.deploy(host, current.commit()).await?;
        output.success(&format!(
            "✓ {}:{} now serving {}",
            branch.repo(),
            branch.name(),
            checkout.name()
        ));
    }
    Ok(())
}
