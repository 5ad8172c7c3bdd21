// ABOUTME: Runner driven by arbitrary start/stop shell commands.
// ABOUTME: Commands run in the current checkout, or the branch state dir when there is none.

use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;

use super::Runner;
use crate::branch::Branch;
use crate::config::ShellConfig;
use crate::error::{IoResultExt, Result};
use crate::exec;

pub struct Shell {
    name: String,
    config: ShellConfig,
}

impl Shell {
    pub fn new(name: &str, config: ShellConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
        }
    }

    async fn run(&self, branch: &Branch, command: &str) -> Result<()> {
        let cwd = working_dir(branch)?;
        let env = branch.command_env()?;
        tracing::debug!(runner = %self.name, %command, cwd = %cwd.display(), "running shell runner command");
        exec::run_shell(command, &cwd, &env).await?;
        Ok(())
    }
}

fn working_dir(branch: &Branch) -> Result<PathBuf> {
    if let Some(checkout) = branch.current_checkout()? {
        return Ok(checkout.path().to_path_buf());
    }
    let dir = branch.state_dir();
    fs::create_dir_all(&dir).at_path(&dir)?;
    Ok(dir)
}

#[async_trait]
impl Runner for Shell {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "Shell"
    }

    async fn enable_maintenance(&self, branch: &Branch) -> Result<()> {
        self.run(branch, &self.config.stop).await
    }

    async fn disable_maintenance(&self, branch: &Branch) -> Result<()> {
        self.run(branch, &self.config.start).await
    }
}
