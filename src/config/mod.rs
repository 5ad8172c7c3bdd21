// ABOUTME: Configuration types and parsing for config/repos/<repo>.yml.
// ABOUTME: Handles YAML parsing, branch validation, hooks, runners and env interpolation.

mod deserialize;
mod env_value;
mod hooks;
mod host;
mod runner;

pub use env_value::{EnvValue, resolve_env_map};
pub use hooks::{HookCommands, HookPoint, Hooks};
pub use host::{HostConfig, RoutingConfig};
pub use runner::{RunnerConfig, ShellConfig, SimpleProcessConfig};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::Path;

use crate::error::{Error, IoResultExt, Result};
use crate::types::BranchName;

/// Configuration of one repo: its deployable branches.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoConfig {
    #[serde(default, deserialize_with = "deserialize::deserialize_branches")]
    pub branches: BTreeMap<BranchName, BranchConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchConfig {
    /// Git branch to track. Defaults to the branch's config key.
    #[serde(default)]
    pub branch: Option<String>,

    #[serde(default)]
    pub env: HashMap<String, EnvValue>,

    #[serde(default)]
    pub hooks: Hooks,

    #[serde(default)]
    pub custom_cmds: BTreeMap<String, String>,

    #[serde(default)]
    pub runners: BTreeMap<String, RunnerConfig>,
}

impl BranchConfig {
    /// The git branch this configuration deploys.
    pub fn tracked_ref<'a>(&'a self, name: &'a BranchName) -> &'a str {
        self.branch.as_deref().unwrap_or(name.as_str())
    }
}

impl RepoConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    /// Load a repo config, reporting parse failures against the file.
    pub fn load(path: &Path) -> Result<Self> {
        load_yaml(path)
    }
}

pub(crate) fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = match std::fs::read_to_string(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        other => other.at_path(path)?,
    };

    serde_yaml::from_str(&content).map_err(|e| Error::InvalidConfig {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
