// ABOUTME: Long-running processes supervised through daemontools service directories.
// ABOUTME: Writes `run` scripts, drives them with svc/svstat, and sweeps orphaned services.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;

use super::Runner;
use crate::branch::Branch;
use crate::config::{RunnerConfig, SimpleProcessConfig};
use crate::error::{Error, IoResultExt, Result};
use crate::exec::{self, Env, shell_quote};
use crate::layout::Layout;
use crate::store::write_atomic_with_mode;

const RUN_SCRIPT: &str = "run";
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct SimpleProcess {
    name: String,
    config: SimpleProcessConfig,
}

impl SimpleProcess {
    pub fn new(name: &str, config: SimpleProcessConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
        }
    }

    fn service_dirs(&self, branch: &Branch) -> Vec<PathBuf> {
        service_dirs_for(branch, &self.name, self.config.process_count)
    }

    /// Wait until svstat reports the service down.
    async fn wait_down(&self, dir: &Path) -> Result<()> {
        let deadline = Instant::now() + self.config.stop_timeout;
        let target = dir.to_string_lossy();
        loop {
            let status = exec::output("svstat", &[target.as_ref()], None).await?;
            if reports_down(&status) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::RunnerStopTimeout {
                    runner: self.name.clone(),
                    secs: self.config.stop_timeout.as_secs(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl Runner for SimpleProcess {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "SimpleProcess"
    }

    async fn enable_maintenance(&self, branch: &Branch) -> Result<()> {
        for dir in self.service_dirs(branch) {
            if !dir.is_dir() {
                continue;
            }
            let target = dir.to_string_lossy();
            exec::run("svc", &["-d", target.as_ref()], None, None).await?;
            self.wait_down(&dir).await?;
        }
        Ok(())
    }

    async fn disable_maintenance(&self, branch: &Branch) -> Result<()> {
        let Some(checkout) = branch.current_checkout()? else {
            tracing::info!(
                runner = %self.name,
                repo = %branch.repo(),
                branch = %branch.name(),
                "no current checkout, leaving processes down"
            );
            return Ok(());
        };

        let env = branch.command_env()?;
        for (index, dir) in self.service_dirs(branch).into_iter().enumerate() {
            fs::create_dir_all(&dir).at_path(&dir)?;
            let script = run_script(checkout.path(), &self.config.cmd, &env, index);
            write_atomic_with_mode(&dir.join(RUN_SCRIPT), script.as_bytes(), 0o755)?;

            let target = dir.to_string_lossy();
            exec::run("svc", &["-u", target.as_ref()], None, None).await?;
        }
        Ok(())
    }
}

fn service_dirs_for(branch: &Branch, runner: &str, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|index| {
            branch
                .layout()
                .service_dir(branch.repo(), branch.name(), runner, index)
        })
        .collect()
}

/// Service directories that the branch's configured SimpleProcess runners own.
pub fn owned_service_dirs(branch: &Branch) -> Vec<PathBuf> {
    branch
        .config()
        .runners
        .iter()
        .filter_map(|(name, config)| match config {
            RunnerConfig::SimpleProcess(sp) => {
                Some(service_dirs_for(branch, name, sp.process_count))
            }
            RunnerConfig::Shell(_) => None,
        })
        .flatten()
        .collect()
}

/// Stop and delete every service directory not in `live`. Returns what was removed.
pub async fn cleanup_services(layout: &Layout, live: &BTreeSet<PathBuf>) -> Result<Vec<PathBuf>> {
    let root = layout.services_dir();
    let entries = match fs::read_dir(&root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).at_path(&root),
    };

    let mut stale = Vec::new();
    for entry in entries {
        let path = entry.at_path(&root)?.path();
        if path.is_dir() && !live.contains(&path) {
            stale.push(path);
        }
    }
    stale.sort();

    for dir in &stale {
        let target = dir.to_string_lossy();
        // A directory svscan never picked up has no supervisor to talk to.
        if let Err(e) = exec::run("svc", &["-dx", target.as_ref()], None, None).await {
            tracing::warn!(dir = %dir.display(), error = %e, "could not stop stale service");
        }
        tracing::info!(dir = %dir.display(), "removing stale service directory");
        fs::remove_dir_all(dir).at_path(dir)?;
    }
    Ok(stale)
}

fn reports_down(svstat: &str) -> bool {
    svstat
        .split_once(": ")
        .is_some_and(|(_, state)| state.starts_with("down"))
}

/// Render the daemontools `run` script for process `index`.
fn run_script(checkout: &Path, cmd: &str, env: &Env, index: usize) -> String {
    let mut vars: BTreeMap<&str, &str> = env
        .iter()
        .filter(|(key, _)| !key.is_empty() && !key.contains('='))
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    let process = index.to_string();
    vars.insert("WHARF_PROCESS", &process);

    let mut script = String::from("#!/bin/sh\nexec 2>&1\n");
    script.push_str(&format!(
        "cd {} || exit 1\n",
        shell_quote(&checkout.to_string_lossy())
    ));
    script.push_str("exec env -i");
    for (key, value) in vars {
        script.push_str(" \\\n  ");
        script.push_str(&shell_quote(&format!("{key}={value}")));
    }
    script.push_str(&format!(" \\\n  sh -c {}\n", shell_quote(cmd)));
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svstat_down_detection() {
        assert!(reports_down("/srv/services/a: down 3 seconds, normally up\n"));
        assert!(!reports_down("/srv/services/a: up (pid 42) 10 seconds\n"));
        assert!(!reports_down("/srv/services/a: supervise not running\n"));
    }

    #[test]
    fn run_script_pins_checkout_env_and_index() {
        let env = Env::from([("PORT".to_string(), "8000".to_string())]);
        let script = run_script(Path::new("/srv/checkouts/a b"), "./server --x", &env, 1);

        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains("cd '/srv/checkouts/a b' || exit 1"));
        assert!(script.contains("'PORT=8000'"));
        assert!(script.contains("'WHARF_PROCESS=1'"));
        assert!(script.ends_with("sh -c './server --x'\n"));
    }

    #[tokio::test]
    async fn cleanup_keeps_live_services() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        let live_dir = layout.services_dir().join("shop--main--web--0");
        fs::create_dir_all(&live_dir).unwrap();

        let live = BTreeSet::from([live_dir.clone()]);
        let removed = cleanup_services(&layout, &live).await.unwrap();

        assert!(removed.is_empty());
        assert!(live_dir.is_dir());
    }
}
