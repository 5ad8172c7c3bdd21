// ABOUTME: Runners start and stop the processes serving a branch's current checkout.
// ABOUTME: The set of runner kinds is closed and resolved from RunnerConfig at load time.

mod shell;
mod simple_process;

pub use shell::Shell;
pub use simple_process::{SimpleProcess, cleanup_services, owned_service_dirs};

use async_trait::async_trait;

use crate::branch::Branch;
use crate::config::RunnerConfig;
use crate::error::Result;

/// Process supervision for one named runner of a branch.
///
/// Both transitions must be idempotent and may block until the change is
/// externally observable.
#[async_trait]
pub trait Runner: Send + Sync {
    fn name(&self) -> &str;

    /// Configuration type name, e.g. `SimpleProcess`.
    fn kind(&self) -> &'static str;

    /// Stop serving: the branch's processes must be down when this returns.
    async fn enable_maintenance(&self, branch: &Branch) -> Result<()>;

    /// (Re)start serving from whichever checkout the branch currently points at.
    async fn disable_maintenance(&self, branch: &Branch) -> Result<()>;
}

pub fn from_config(name: &str, config: &RunnerConfig) -> Box<dyn Runner> {
    match config {
        RunnerConfig::SimpleProcess(config) => Box::new(SimpleProcess::new(name, config.clone())),
        RunnerConfig::Shell(config) => Box::new(Shell::new(name, config.clone())),
    }
}
