// ABOUTME: Operator commands acting on running branches: restart, custom commands, cleanup.
// ABOUTME: All of them hold the host lock for their whole run.

use std::collections::BTreeSet;
use wharf::branch::Branch;
use wharf::error::Result;
use wharf::host::Host;
use wharf::runner::{cleanup_services, owned_service_dirs};
use wharf::types::{BranchName, RepoName};

fn open_branch(host: &Host, repo: &str, branch: &str) -> Result<Branch> {
    let repo = host.repo(&RepoName::from_ssh_arg(repo)?)?;
    repo.branch(&BranchName::new(branch)?)
}

pub async fn restart(host: &Host, repo: &str, branch: &str) -> Result<()> {
    let _lock = host.lock()?;
    let branch = open_branch(host, repo, branch)?;
    branch.restart(host).await?;
    host.output()
        .success(&format!("✓ Restarted {}:{}", branch.repo(), branch.name()));
    Ok(())
}

pub async fn run_custom(host: &Host, repo: &str, branch: &str, cmd: &str) -> Result<()> {
    let _lock = host.lock()?;
    let branch = open_branch(host, repo, branch)?;
    branch.run_custom_cmd(cmd).await
}

pub async fn cleanup(host: &Host) -> Result<()> {
    let _lock = host.lock()?;

    let mut live = BTreeSet::new();
    for repo in host.repos()? {
        for branch in repo.branches() {
            live.extend(owned_service_dirs(&branch));
        }
    }

    let removed = cleanup_services(host.layout(), &live).await?;
    let output = host.output();
    for dir in &removed {
        output.progress(&format!("Removed {}", dir.display()));
    }
    output.success(&format!("✓ Removed {} stale service(s)", removed.len()));
    Ok(())
}
