// ABOUTME: A deployable branch of a repo and the state machines that act on it.
// ABOUTME: Owns the active-checkout pointer and drives deploy, restart and custom commands.

use std::path::PathBuf;
use tracing::Instrument;

use crate::checkout::Checkout;
use crate::config::{BranchConfig, resolve_env_map};
use crate::deploy::Deployment;
use crate::error::{Error, Result};
use crate::exec::{self, Env};
use crate::host::Host;
use crate::layout::Layout;
use crate::routing::RoutingPublisher;
use crate::runner::{self, Runner};
use crate::store::StateStore;
use crate::types::{BranchName, CommitId, RepoName};

pub struct Branch {
    repo: RepoName,
    name: BranchName,
    config: BranchConfig,
    store: StateStore,
    runners: Vec<Box<dyn Runner>>,
}

impl Branch {
    /// Build a branch with runners resolved from its configuration.
    pub fn new(repo: RepoName, name: BranchName, config: BranchConfig, store: StateStore) -> Self {
        let runners = config
            .runners
            .iter()
            .map(|(runner_name, runner_config)| runner::from_config(runner_name, runner_config))
            .collect();
        Self {
            repo,
            name,
            config,
            store,
            runners,
        }
    }

    /// Replace the configured runners.
    pub fn with_runners(mut self, runners: Vec<Box<dyn Runner>>) -> Self {
        self.runners = runners;
        self
    }

    pub fn repo(&self) -> &RepoName {
        &self.repo
    }

    pub fn name(&self) -> &BranchName {
        &self.name
    }

    pub fn config(&self) -> &BranchConfig {
        &self.config
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn layout(&self) -> &Layout {
        self.store.layout()
    }

    pub fn runners(&self) -> &[Box<dyn Runner>] {
        &self.runners
    }

    /// Git branch whose pushes deploy this branch.
    pub fn tracked_ref(&self) -> &str {
        self.config.tracked_ref(&self.name)
    }

    pub fn repo_path(&self) -> PathBuf {
        self.layout().repo_path(&self.repo)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.layout().branch_state_dir(&self.repo, &self.name)
    }

    pub fn checkouts_dir(&self) -> PathBuf {
        self.layout().checkouts_dir(&self.repo, &self.name)
    }

    /// Environment for hooks, builders, runners and custom commands.
    pub fn command_env(&self) -> Result<Env> {
        let branch_env = resolve_env_map(&self.config.env)?;
        Ok(exec::overlay_env(&branch_env))
    }

    pub fn checkouts(&self) -> Result<Vec<Checkout>> {
        Checkout::all_for_branch(self)
    }

    /// Resolve the pointer without modifying it. Safe without the host lock.
    pub fn peek_current_checkout(&self) -> Result<Option<Checkout>> {
        let Some(name) = self.store.active_checkout(&self.repo, &self.name) else {
            return Ok(None);
        };
        Ok(self
            .checkouts()?
            .into_iter()
            .find(|c| c.name().as_str() == name))
    }

    /// The checkout named by the pointer.
    ///
    /// A pointer naming a checkout that no longer exists is deleted and
    /// reported as no current checkout. The caller must hold the host lock.
    pub fn current_checkout(&self) -> Result<Option<Checkout>> {
        if let Some(checkout) = self.peek_current_checkout()? {
            return Ok(Some(checkout));
        }
        let Some(name) = self.store.active_checkout(&self.repo, &self.name) else {
            return Ok(None);
        };

        tracing::warn!(
            repo = %self.repo,
            branch = %self.name,
            pointer = %name,
            "current checkout is missing, clearing pointer"
        );
        if let Err(e) = self.store.clear_active_checkout(&self.repo, &self.name) {
            tracing::warn!(error = %e, "could not clear stale checkout pointer");
        }
        Ok(None)
    }

    /// Deploy `commit`: new checkout, build, maintenance, swap, prune.
    ///
    /// The caller must hold the host lock.
    pub async fn deploy(&self, host: &Host, commit: &CommitId) -> Result<Checkout> {
        let output = host.output();
        let publisher = host.publisher();
        let span = tracing::info_span!("deploy", repo = %self.repo, branch = %self.name, commit = %commit.short());

        async {
            output.progress(&format!("→ Creating checkout of {}", commit.short()));
            let deployment = Deployment::create(self, commit)
                .instrument(tracing::info_span!("create_checkout"))
                .await?;

            output.progress(&format!("→ Building {}", deployment.checkout().name()));
            let deployment = deployment
                .build(host.builders())
                .instrument(tracing::info_span!("build"))
                .await?;

            output.progress("→ Entering maintenance");
            let deployment = deployment
                .enter_maintenance(publisher)
                .instrument(tracing::info_span!("enter_maintenance"))
                .await?;

            output.progress("→ Running maintenance hook");
            let deployment = deployment
                .run_maintenance_hook()
                .instrument(tracing::info_span!("maintenance_hook"))
                .await?;

            output.progress("→ Switching current checkout");
            let deployment = deployment.swap()?;

            output.progress("→ Leaving maintenance");
            let deployment = deployment
                .exit_maintenance(publisher)
                .instrument(tracing::info_span!("exit_maintenance"))
                .await?;

            output.progress("→ Removing old checkouts");
            let deployment = deployment.prune()?;
            tracing::info!(pruned = deployment.pruned().len(), "deploy complete");

            Ok::<_, Error>(deployment.finish())
        }
        .instrument(span)
        .await
    }

    /// Bounce the runners without changing the current checkout.
    pub async fn restart(&self, host: &Host) -> Result<()> {
        let publisher = host.publisher();
        async {
            self.enable_maintenance(publisher).await?;
            self.disable_maintenance(publisher).await
        }
        .instrument(tracing::info_span!("restart", repo = %self.repo, branch = %self.name))
        .await
    }

    /// Run the configured custom command `name` in the current checkout.
    pub async fn run_custom_cmd(&self, name: &str) -> Result<()> {
        if !self.config.custom_cmds.contains_key(name) {
            return Err(Error::UnknownCustomCommand {
                repo: self.repo.to_string(),
                branch: self.name.to_string(),
                name: name.to_string(),
            });
        }

        let checkout = self
            .current_checkout()?
            .ok_or_else(|| Error::NoCurrentCheckout {
                repo: self.repo.to_string(),
                branch: self.name.to_string(),
            })?;
        checkout.run_custom_cmd(self, name).await
    }

    /// Mark the branch in maintenance, stop every runner, republish routing.
    pub(crate) async fn enable_maintenance(&self, publisher: &dyn RoutingPublisher) -> Result<()> {
        self.store.set_maintenance(&self.repo, &self.name, true)?;
        for runner in &self.runners {
            tracing::debug!(runner = runner.name(), "enabling maintenance");
            runner.enable_maintenance(self).await?;
        }
        publisher.configure_all().await
    }

    /// Start every runner on the current checkout, clear the marker, republish routing.
    pub(crate) async fn disable_maintenance(&self, publisher: &dyn RoutingPublisher) -> Result<()> {
        for runner in &self.runners {
            tracing::debug!(runner = runner.name(), "disabling maintenance");
            runner.disable_maintenance(self).await?;
        }
        self.store.set_maintenance(&self.repo, &self.name, false)?;
        publisher.configure_all().await
    }
}
