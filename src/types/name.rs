// ABOUTME: Validated repo and branch names.
// ABOUTME: Names become path components, so separators and dot-prefixes are rejected.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("{kind} name cannot be empty")]
    Empty { kind: &'static str },

    #[error("{kind} name exceeds maximum length of 100 characters")]
    TooLong { kind: &'static str },

    #[error("{kind} name cannot start with a dot")]
    StartsWithDot { kind: &'static str },

    #[error("invalid character in {kind} name: '{ch}'")]
    InvalidChar { kind: &'static str, ch: char },
}

fn validate(kind: &'static str, value: &str) -> Result<(), NameError> {
    if value.is_empty() {
        return Err(NameError::Empty { kind });
    }

    if value.len() > 100 {
        return Err(NameError::TooLong { kind });
    }

    if value.starts_with('.') {
        return Err(NameError::StartsWithDot { kind });
    }

    for ch in value.chars() {
        if !ch.is_ascii_alphanumeric() && !matches!(ch, '-' | '_' | '.') {
            return Err(NameError::InvalidChar { kind, ch });
        }
    }

    Ok(())
}

/// Name of a bare repository under `repos/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoName(String);

impl RepoName {
    pub fn new(value: &str) -> Result<Self, NameError> {
        validate("repo", value)?;
        Ok(Self(value.to_string()))
    }

    /// Parse a repo name as it arrives through an SSH forced command.
    ///
    /// `$SSH_ORIGINAL_COMMAND` is expanded without re-parsing quotes, so git's
    /// `git-receive-pack 'name'` reaches us with the quotes still attached.
    pub fn from_ssh_arg(value: &str) -> Result<Self, NameError> {
        let trimmed = value
            .strip_prefix('\'')
            .and_then(|v| v.strip_suffix('\''))
            .unwrap_or(value);
        Self::new(trimmed)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a configured branch (the key in the repo config, not the git ref).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn new(value: &str) -> Result<Self, NameError> {
        validate("branch", value)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_names() {
        assert!(RepoName::new("my-app").is_ok());
        assert!(RepoName::new("my_app.v2").is_ok());
        assert!(BranchName::new("production").is_ok());
    }

    #[test]
    fn rejects_path_like_names() {
        assert_eq!(
            RepoName::new("a/b"),
            Err(NameError::InvalidChar {
                kind: "repo",
                ch: '/'
            })
        );
        assert_eq!(
            BranchName::new(".."),
            Err(NameError::StartsWithDot { kind: "branch" })
        );
        assert_eq!(
            RepoName::new(""),
            Err(NameError::Empty { kind: "repo" })
        );
    }

    #[test]
    fn ssh_arg_strips_single_quotes() {
        assert_eq!(RepoName::from_ssh_arg("'myapp'").unwrap().as_str(), "myapp");
        assert_eq!(RepoName::from_ssh_arg("myapp").unwrap().as_str(), "myapp");
        assert!(RepoName::from_ssh_arg("'my app'").is_err());
    }
}
