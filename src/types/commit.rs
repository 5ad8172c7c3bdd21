// ABOUTME: Git commit identifier validation.
// ABOUTME: Checkout directories embed an 11 character prefix of the commit.

use std::fmt;
use thiserror::Error;

/// Number of commit characters encoded in a checkout directory name.
pub const SHORT_COMMIT_LEN: usize = 11;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitIdError {
    #[error("commit id must be between 4 and 64 characters, got {0}")]
    BadLength(usize),

    #[error("invalid character in commit id: '{0}'")]
    InvalidChar(char),
}

/// A (possibly abbreviated) hexadecimal git object id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(value: &str) -> Result<Self, CommitIdError> {
        let value = value.trim();
        if !(4..=64).contains(&value.len()) {
            return Err(CommitIdError::BadLength(value.len()));
        }

        if let Some(c) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(CommitIdError::InvalidChar(c));
        }

        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The prefix used in checkout directory names.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(SHORT_COMMIT_LEN);
        &self.0[..end]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
