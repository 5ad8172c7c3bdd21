// ABOUTME: Timestamp-derived checkout creation names and directory name parsing.
// ABOUTME: Directory names have the form `{creation-name}-{commit-prefix}`.

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone};
use std::fmt;
use thiserror::Error;

use super::commit::{CommitId, CommitIdError};

const NAME_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutNameError {
    #[error("checkout name '{0}' is not a {NAME_FORMAT} timestamp")]
    BadTimestamp(String),

    #[error("checkout directory '{0}' is not of the form <name>-<commit>")]
    MissingSeparator(String),

    #[error("checkout directory has an invalid commit prefix: {0}")]
    BadCommit(#[from] CommitIdError),
}

/// Creation name of a checkout. Lexicographic order is chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CheckoutName(String);

impl CheckoutName {
    /// Creation name for a checkout made right now.
    pub fn now() -> Self {
        Self::at(&Local::now())
    }

    pub fn at<Tz: TimeZone>(time: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(time.format(NAME_FORMAT).to_string())
    }

    /// Creation name for a new checkout that sorts after `latest`.
    ///
    /// Two checkouts made within the same second, or after the clock stepped
    /// back, get `latest` plus one second instead of the wall clock.
    pub fn next_after(latest: Option<&CheckoutName>) -> Self {
        let now = Self::now();
        match latest {
            Some(latest) if now <= *latest => latest.succ(),
            _ => now,
        }
    }

    fn succ(&self) -> Self {
        match NaiveDateTime::parse_from_str(&self.0, NAME_FORMAT) {
            Ok(time) => Self((time + TimeDelta::seconds(1)).format(NAME_FORMAT).to_string()),
            Err(_) => Self::now(),
        }
    }

    pub fn parse(value: &str) -> Result<Self, CheckoutNameError> {
        let value = value.trim();
        NaiveDateTime::parse_from_str(value, NAME_FORMAT)
            .map_err(|_| CheckoutNameError::BadTimestamp(value.to_string()))?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory name for this checkout of `commit`.
    pub fn dir_name(&self, commit: &CommitId) -> String {
        format!("{}-{}", self.0, commit.short())
    }

    /// Split a checkout directory name back into creation name and commit prefix.
    pub fn parse_dir_name(dir_name: &str) -> Result<(Self, CommitId), CheckoutNameError> {
        let (name, commit) = dir_name
            .split_once('-')
            .ok_or_else(|| CheckoutNameError::MissingSeparator(dir_name.to_string()))?;
        Ok((Self::parse(name)?, CommitId::new(commit)?))
    }
}

impl fmt::Display for CheckoutName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
