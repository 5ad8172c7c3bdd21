// ABOUTME: Checkouts: immutable, built, on-disk snapshots of one commit of one branch.
// ABOUTME: Covers creation from the bare repo, the build pipeline, enumeration and removal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::branch::Branch;
use crate::builders::Builder;
use crate::config::HookPoint;
use crate::error::{Error, IoResultExt, Result};
use crate::exec::{self, Env};
use crate::types::{CheckoutName, CommitId};

const GIT_DIR_NAME: &str = ".git";

/// One checkout directory of a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    commit: CommitId,
    name: CheckoutName,
    path: PathBuf,
}

impl Checkout {
    /// Handle for the checkout `name` of `commit` under `root`. Does not touch disk.
    pub fn new(root: &Path, commit: CommitId, name: CheckoutName) -> Self {
        let path = root.join(name.dir_name(&commit));
        Self { commit, name, path }
    }

    pub fn commit(&self) -> &CommitId {
        &self.commit
    }

    pub fn name(&self) -> &CheckoutName {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clone the branch's repository at `commit` into a fresh checkout directory.
    ///
    /// On failure the partially created directory is left behind.
    pub async fn create(branch: &Branch, commit: &CommitId) -> Result<Self> {
        let root = branch.checkouts_dir();
        fs::create_dir_all(&root).at_path(&root)?;

        let latest = Self::all_for_branch(branch)?.into_iter().map(|c| c.name).max();
        let name = CheckoutName::next_after(latest.as_ref());
        let checkout = Self::new(&root, commit.clone(), name);
        let repo_path = branch.repo_path();
        tracing::info!(
            checkout = %checkout.name,
            commit = %commit,
            path = %checkout.path.display(),
            "creating checkout"
        );

        let source = repo_path.to_string_lossy();
        let target = checkout.path.to_string_lossy();
        exec::run_git(&["clone", "-q", source.as_ref(), target.as_ref()], None).await?;

        let cwd = Some(checkout.path.as_path());
        exec::run_git(&["config", "advice.detachedHead", "false"], cwd).await?;
        exec::run_git(&["checkout", "-q", commit.as_str()], cwd).await?;
        exec::run_git(&["submodule", "update", "--init", "--recursive"], cwd).await?;

        strip_git_metadata(&checkout.path)?;
        Ok(checkout)
    }

    /// All checkouts of `branch`, oldest first.
    ///
    /// A branch that has never been deployed has no checkout directory yet;
    /// that is an empty list, not an error.
    pub fn all_for_branch(branch: &Branch) -> Result<Vec<Self>> {
        let root = branch.checkouts_dir();
        let entries = match fs::read_dir(&root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).at_path(&root),
        };

        let mut checkouts = Vec::new();
        for entry in entries {
            let entry = entry.at_path(&root)?;
            if !entry.file_type().at_path(&entry.path())?.is_dir() {
                continue;
            }

            let file_name = entry.file_name();
            let Some(dir_name) = file_name.to_str() else {
                continue;
            };

            match CheckoutName::parse_dir_name(dir_name) {
                Ok((name, commit)) => checkouts.push(Self {
                    commit,
                    name,
                    path: entry.path(),
                }),
                Err(e) => tracing::debug!(dir = dir_name, error = %e, "skipping foreign directory"),
            }
        }

        checkouts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(checkouts)
    }

    /// Run the build pipeline: `before_build`, applicable builders, `build`, `after_build`.
    pub async fn build(&self, branch: &Branch, builders: &[Box<dyn Builder>]) -> Result<()> {
        let env = branch.command_env()?;

        self.run_hook_with_env(branch, HookPoint::BeforeBuild, &env)
            .await?;

        for builder in builders {
            if builder.is_applicable(self) {
                tracing::info!(builder = builder.name(), checkout = %self.name, "running builder");
                builder.build(self, &env).await?;
            }
        }

        self.run_hook_with_env(branch, HookPoint::Build, &env).await?;
        self.run_hook_with_env(branch, HookPoint::AfterBuild, &env)
            .await
    }

    /// Run the commands configured for `point`, if any, inside this checkout.
    pub async fn run_hook(&self, branch: &Branch, point: HookPoint) -> Result<()> {
        let env = branch.command_env()?;
        self.run_hook_with_env(branch, point, &env).await
    }

    async fn run_hook_with_env(&self, branch: &Branch, point: HookPoint, env: &Env) -> Result<()> {
        let Some(commands) = branch.config().hooks.commands(point) else {
            return Ok(());
        };

        tracing::info!(hook = point.name(), checkout = %self.name, "running hook");
        for command in commands.iter() {
            exec::run_shell(command, &self.path, env).await?;
        }
        Ok(())
    }

    /// Run one of the branch's custom commands inside this checkout.
    pub async fn run_custom_cmd(&self, branch: &Branch, name: &str) -> Result<()> {
        let command = branch.config().custom_cmds.get(name).ok_or_else(|| {
            Error::UnknownCustomCommand {
                repo: branch.repo().to_string(),
                branch: branch.name().to_string(),
                name: name.to_string(),
            }
        })?;

        let env = branch.command_env()?;
        exec::run_shell(command, &self.path, &env).await?;
        Ok(())
    }

    /// Delete the checkout directory. The directory must exist.
    pub fn remove(&self) -> Result<()> {
        tracing::info!(checkout = %self.name, path = %self.path.display(), "removing checkout");
        fs::remove_dir_all(&self.path).at_path(&self.path)
    }
}

/// Delete every `.git` directory or gitlink file below `root`.
fn strip_git_metadata(root: &Path) -> Result<()> {
    let mut found = Vec::new();
    // Children of a .git directory are filtered so the walk never descends into one.
    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !inside_git_dir(entry.path()));

    for entry in walker {
        let entry = entry.map_err(io::Error::from).at_path(root)?;
        if entry.file_name() == GIT_DIR_NAME {
            found.push((entry.path().to_path_buf(), entry.file_type().is_dir()));
        }
    }

    for (path, is_dir) in found {
        tracing::debug!(path = %path.display(), "removing git metadata");
        if is_dir {
            fs::remove_dir_all(&path).at_path(&path)?;
        } else {
            fs::remove_file(&path).at_path(&path)?;
        }
    }
    Ok(())
}

fn inside_git_dir(path: &Path) -> bool {
    path.parent()
        .and_then(Path::file_name)
        .is_some_and(|name| name == GIT_DIR_NAME)
}
