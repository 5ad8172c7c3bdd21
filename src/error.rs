// ABOUTME: Application-wide error types for wharf.
// ABOUTME: Uses thiserror; `kind()` groups variants into the outcomes callers act on.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::exec::CommandError;
use crate::store::LockInfo;
use crate::types::{CommitIdError, NameError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("wharf is already running{}. Please try again later.", describe_holder(.0))]
    Busy(Option<LockInfo>),

    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration in {}: {message}", .path.display())]
    InvalidConfig { path: PathBuf, message: String },

    #[error("unknown repo: {0}")]
    UnknownRepo(String),

    #[error("branch {branch} is not configured for repo {repo}")]
    UnknownBranch { repo: String, branch: String },

    #[error(
        "You are pushing something other than a branch ({0}).\nOnly branches are currently supported targets!"
    )]
    NotABranch(String),

    #[error("This branch is not configured! ({0})")]
    BranchNotTracked(String),

    #[error("malformed ref update from git: {0:?}")]
    MalformedRefUpdate(String),

    #[error("cannot determine the wharf home directory: pass --home or set WHARF_HOME or HOME")]
    NoHome,

    #[error("unknown custom command '{name}' for {repo}:{branch}")]
    UnknownCustomCommand {
        repo: String,
        branch: String,
        name: String,
    },

    #[error("{repo}:{branch} has no current checkout")]
    NoCurrentCheckout { repo: String, branch: String },

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid name: {0}")]
    InvalidName(#[from] NameError),

    #[error("invalid commit: {0}")]
    InvalidCommit(#[from] CommitIdError),

    #[error("runner {runner} did not stop within {secs}s")]
    RunnerStopTimeout { runner: String, secs: u64 },

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("{}: {source}", .path.display())]
    Fs {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Another mutating command holds the host lock.
    Busy,
    /// Configuration is missing, malformed or does not cover the request.
    Configuration,
    /// An external command exited non-zero or could not be started.
    ExternalCommand,
    /// Unexpected filesystem failure.
    Filesystem,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Busy(_) => ErrorKind::Busy,
            Error::ConfigNotFound(_)
            | Error::InvalidConfig { .. }
            | Error::UnknownRepo(_)
            | Error::UnknownBranch { .. }
            | Error::NotABranch(_)
            | Error::BranchNotTracked(_)
            | Error::MalformedRefUpdate(_)
            | Error::NoHome
            | Error::UnknownCustomCommand { .. }
            | Error::NoCurrentCheckout { .. }
            | Error::MissingEnvVar(_)
            | Error::InvalidName(_)
            | Error::InvalidCommit(_)
            | Error::Yaml(_) => ErrorKind::Configuration,
            Error::Command(_) | Error::RunnerStopTimeout { .. } => ErrorKind::ExternalCommand,
            Error::Fs { .. } | Error::Io(_) | Error::Json(_) => ErrorKind::Filesystem,
        }
    }
}

fn describe_holder(holder: &Option<LockInfo>) -> String {
    match holder {
        Some(info) => format!(
            " (pid {} on {} since {}: {})",
            info.pid,
            info.holder,
            info.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            info.command
        ),
        None => String::new(),
    }
}

/// Attach the offending path to I/O errors.
pub trait IoResultExt<T> {
    fn at_path(self, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, std::io::Error> {
    fn at_path(self, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Fs {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
