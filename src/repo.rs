// ABOUTME: A repo: its bare git repository, its configuration and its branches.
// ABOUTME: Also installs the pre-receive hook that turns pushes into deploys.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::branch::Branch;
use crate::config::{BranchConfig, RepoConfig};
use crate::error::{Error, IoResultExt, Result};
use crate::exec::{self, shell_quote};
use crate::store::{StateStore, write_atomic_with_mode};
use crate::types::{BranchName, RepoName};

const CONFIG_EXTENSION: &str = "yml";

pub struct Repo {
    name: RepoName,
    config: RepoConfig,
    store: StateStore,
}

impl Repo {
    /// Load the repo named `name` from its configuration file.
    pub fn open(store: &StateStore, name: &RepoName) -> Result<Self> {
        let config = match RepoConfig::load(&store.layout().repo_config(name)) {
            Err(Error::ConfigNotFound(_)) => return Err(Error::UnknownRepo(name.to_string())),
            other => other?,
        };
        Ok(Self {
            name: name.clone(),
            config,
            store: store.clone(),
        })
    }

    /// Every repo with a configuration file, sorted by name.
    pub fn all(store: &StateStore) -> Result<Vec<Self>> {
        let dir = store.layout().repo_configs_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).at_path(&dir),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.at_path(&dir)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CONFIG_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match RepoName::new(stem) {
                Ok(name) => names.push(name),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring config with invalid repo name")
                }
            }
        }
        names.sort();

        names.iter().map(|name| Self::open(store, name)).collect()
    }

    pub fn name(&self) -> &RepoName {
        &self.name
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Path of the bare git repository.
    pub fn path(&self) -> PathBuf {
        self.store.layout().repo_path(&self.name)
    }

    /// Create the bare repository if needed and (re)install its pre-receive hook.
    ///
    /// The hook re-enters `exe` so pushes deploy through this binary.
    pub async fn ensure_initialized(&self, exe: &Path) -> Result<()> {
        let path = self.path();
        if !path.exists() {
            tracing::info!(repo = %self.name, path = %path.display(), "creating bare repository");
            let parent = self.store.layout().repos_dir();
            fs::create_dir_all(&parent).at_path(&parent)?;
            let target = path.to_string_lossy();
            exec::run_git(&["init", "--bare", "-q", target.as_ref()], None).await?;
        }

        let hook = path.join("hooks").join("pre-receive");
        let script = format!(
            "#!/bin/sh\nexec {} --home {} git-pre-receive-hook {}\n",
            shell_quote(&exe.to_string_lossy()),
            shell_quote(&self.store.layout().base().to_string_lossy()),
            shell_quote(self.name.as_str()),
        );
        write_atomic_with_mode(&hook, script.as_bytes(), 0o755)
    }

    /// Every configured branch.
    pub fn branches(&self) -> Vec<Branch> {
        self.config
            .branches
            .iter()
            .map(|(name, config)| self.make_branch(name, config.clone()))
            .collect()
    }

    pub fn branch(&self, name: &BranchName) -> Result<Branch> {
        let config = self
            .config
            .branches
            .get(name)
            .ok_or_else(|| Error::UnknownBranch {
                repo: self.name.to_string(),
                branch: name.to_string(),
            })?;
        Ok(self.make_branch(name, config.clone()))
    }

    /// Branches that deploy pushes to the git branch `git_branch`.
    pub fn branches_tracking(&self, git_branch: &str) -> Vec<Branch> {
        self.branches()
            .into_iter()
            .filter(|b| b.tracked_ref() == git_branch)
            .collect()
    }

    fn make_branch(&self, name: &BranchName, config: BranchConfig) -> Branch {
        Branch::new(self.name.clone(), name.clone(), config, self.store.clone())
    }
}
