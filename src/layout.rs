// ABOUTME: On-disk layout of everything wharf owns under its base directory.
// ABOUTME: Pure path arithmetic; nothing here touches the filesystem.

use std::path::{Path, PathBuf};

use crate::types::{BranchName, RepoName};

pub const LOCK_FILENAME: &str = ".wharf-lock";
pub const POINTER_FILENAME: &str = "current_checkout";
pub const MAINTENANCE_FILENAME: &str = "maintenance";
pub const HOST_CONFIG_FILENAME: &str = "wharf.yml";

/// Root of all wharf state on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    base: PathBuf,
}

impl Layout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn lock_file(&self) -> PathBuf {
        self.base.join(LOCK_FILENAME)
    }

    pub fn repos_dir(&self) -> PathBuf {
        self.base.join("repos")
    }

    pub fn repo_path(&self, repo: &RepoName) -> PathBuf {
        self.repos_dir().join(repo.as_str())
    }

    pub fn config_dir(&self) -> PathBuf {
        self.base.join("config")
    }

    pub fn host_config(&self) -> PathBuf {
        self.config_dir().join(HOST_CONFIG_FILENAME)
    }

    pub fn repo_configs_dir(&self) -> PathBuf {
        self.config_dir().join("repos")
    }

    pub fn repo_config(&self, repo: &RepoName) -> PathBuf {
        self.repo_configs_dir().join(format!("{repo}.yml"))
    }

    pub fn ssh_keys_dir(&self) -> PathBuf {
        self.config_dir().join("ssh_keys")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.base.join("state")
    }

    pub fn branch_state_dir(&self, repo: &RepoName, branch: &BranchName) -> PathBuf {
        self.state_dir().join(repo.as_str()).join(branch.as_str())
    }

    pub fn pointer_file(&self, repo: &RepoName, branch: &BranchName) -> PathBuf {
        self.branch_state_dir(repo, branch).join(POINTER_FILENAME)
    }

    pub fn maintenance_marker(&self, repo: &RepoName, branch: &BranchName) -> PathBuf {
        self.branch_state_dir(repo, branch).join(MAINTENANCE_FILENAME)
    }

    pub fn routes_manifest(&self) -> PathBuf {
        self.state_dir().join("routes.json")
    }

    pub fn checkouts_dir(&self, repo: &RepoName, branch: &BranchName) -> PathBuf {
        self.base
            .join("checkouts")
            .join(repo.as_str())
            .join(branch.as_str())
    }

    pub fn services_dir(&self) -> PathBuf {
        self.base.join("services")
    }

    /// Service directory of one supervised process.
    pub fn service_dir(
        &self,
        repo: &RepoName,
        branch: &BranchName,
        runner: &str,
        index: usize,
    ) -> PathBuf {
        self.services_dir()
            .join(format!("{repo}--{branch}--{runner}--{index}"))
    }
}
