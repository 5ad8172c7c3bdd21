// ABOUTME: Turns the ref updates git feeds a pre-receive hook into deploys.
// ABOUTME: Every line is validated before the first deploy starts.

use crate::branch::Branch;
use crate::error::{Error, Result};
use crate::host::Host;
use crate::repo::Repo;
use crate::types::CommitId;

const BRANCH_PREFIX: &str = "refs/heads/";

/// One `<old> <new> <ref>` line from git.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefUpdate {
    pub old: String,
    pub new: String,
    pub refname: String,
}

impl RefUpdate {
    pub fn parse(line: &str) -> Result<Self> {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(old), Some(new), Some(refname), None) => Ok(Self {
                old: old.to_string(),
                new: new.to_string(),
                refname: refname.to_string(),
            }),
            _ => Err(Error::MalformedRefUpdate(line.to_string())),
        }
    }

    /// The pushed branch name, or `NotABranch` for tags and other refs.
    pub fn branch(&self) -> Result<&str> {
        self.refname
            .strip_prefix(BRANCH_PREFIX)
            .ok_or_else(|| Error::NotABranch(self.refname.clone()))
    }

    /// Git signals a deleted ref with an all-zero new id.
    pub fn is_deletion(&self) -> bool {
        self.new.chars().all(|c| c == '0')
    }
}

/// A validated push: the commit to deploy on each matching branch.
pub struct PushPlan {
    pub deploys: Vec<(Branch, CommitId)>,
}

/// Validate every ref update in `input` against the repo's branches.
pub fn plan_push(repo: &Repo, input: &str) -> Result<PushPlan> {
    let mut deploys = Vec::new();
    for line in input.lines().filter(|l| !l.trim().is_empty()) {
        let update = RefUpdate::parse(line)?;
        let git_branch = update.branch()?;

        let branches = repo.branches_tracking(git_branch);
        if branches.is_empty() {
            return Err(Error::BranchNotTracked(git_branch.to_string()));
        }

        if update.is_deletion() {
            tracing::warn!(refname = %update.refname, "branch deleted, deployed state left as is");
            continue;
        }

        let commit = CommitId::new(&update.new)?;
        deploys.extend(branches.into_iter().map(|b| (b, commit.clone())));
    }
    Ok(PushPlan { deploys })
}

/// Deploy every branch tracking a pushed ref. Returns the number of deploys.
///
/// The caller must hold the host lock.
pub async fn deploy_push(host: &Host, repo: &Repo, input: &str) -> Result<usize> {
    let plan = plan_push(repo, input)?;
    let output = host.output();
    for (branch, commit) in &plan.deploys {
        output.progress(&format!(
            "Deploying {}:{} at {}",
            branch.repo(),
            branch.name(),
            commit.short()
        ));
        let checkout = branch.deploy(host, commit).await?;
        output.success(&format!(
            "✓ {}:{} now serving {}",
            branch.repo(),
            branch.name(),
            checkout.name()
        ));
    }
    Ok(plan.deploys.len())
}
