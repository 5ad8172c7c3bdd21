// ABOUTME: git push entry points: the SSH forced command and the pre-receive hook.
// ABOUTME: The hook reads ref updates from stdin and deploys under the host lock.

use std::path::Path;
use tokio::io::AsyncReadExt;
use wharf::error::{IoResultExt, Result};
use wharf::exec::{self, shell_quote};
use wharf::host::Host;
use wharf::push;
use wharf::types::RepoName;

/// Serve `git push` for `repo_arg` through git-shell.
///
/// Stdout carries the git protocol, so nothing else may be printed there.
pub async fn git_receive_pack(host: &Host, repo_arg: &str, exe: &Path) -> Result<()> {
    let repo = host.repo(&RepoName::from_ssh_arg(repo_arg)?)?;

    {
        // The lock only covers repo setup: the hook git-receive-pack runs takes it again.
        let _lock = host.lock()?;
        repo.ensure_initialized(exe).await?;
    }

    let receive = format!("git-receive-pack {}", shell_quote(&repo.path().to_string_lossy()));
    exec::run_attached("git-shell", &["-c", &receive]).await?;
    Ok(())
}

pub async fn git_pre_receive_hook(host: &Host, repo_arg: &str) -> Result<()> {
    let repo = host.repo(&RepoName::from_ssh_arg(repo_arg)?)?;
    let _lock = host.lock()?;

    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .at_path(Path::new("<stdin>"))?;

    let deployed = push::deploy_push(host, &repo, &input).await?;
    tracing::info!(repo = %repo.name(), deployed, "push handled");
    Ok(())
}
