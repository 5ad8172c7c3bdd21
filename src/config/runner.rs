// ABOUTME: Runner configuration, tagged by `type`.
// ABOUTME: The set of runner kinds is closed; an unknown tag fails at load time.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum RunnerConfig {
    /// Long-running processes supervised through daemontools service directories.
    SimpleProcess(SimpleProcessConfig),
    /// Arbitrary start/stop shell commands.
    Shell(ShellConfig),
}

impl RunnerConfig {
    pub fn type_name(&self) -> &'static str {
        match self {
            RunnerConfig::SimpleProcess(_) => "SimpleProcess",
            RunnerConfig::Shell(_) => "Shell",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimpleProcessConfig {
    /// Shell command started in the current checkout.
    pub cmd: String,

    #[serde(default = "default_process_count")]
    pub process_count: usize,

    /// How long to wait for supervised processes to report down.
    #[serde(default = "default_stop_timeout", with = "humantime_serde")]
    pub stop_timeout: Duration,
}

fn default_process_count() -> usize {
    1
}

fn default_stop_timeout() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    pub start: String,
    pub stop: String,
}
