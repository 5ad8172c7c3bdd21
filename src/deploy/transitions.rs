// ABOUTME: State transition methods for deployment orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use crate::builders::Builder;
use crate::config::HookPoint;
use crate::error::Result;
use crate::routing::RoutingPublisher;

use super::Deployment;
use super::state::{Built, Completed, Created, InMaintenance, Live, Migrated, Swapped};

impl<'a, S> Deployment<'a, S> {
    fn transition<T>(self, state: T) -> Deployment<'a, T> {
        Deployment {
            branch: self.branch,
            checkout: self.checkout,
            previous: self.previous,
            state,
        }
    }
}

impl<'a> Deployment<'a, Created> {
    /// Run hooks and builders inside the new checkout.
    ///
    /// A failure here leaves the previous checkout serving untouched.
    pub async fn build(self, builders: &[Box<dyn Builder>]) -> Result<Deployment<'a, Built>> {
        self.checkout.build(self.branch, builders).await?;
        Ok(self.transition(Built))
    }
}

impl<'a> Deployment<'a, Built> {
    pub async fn enter_maintenance(
        self,
        publisher: &dyn RoutingPublisher,
    ) -> Result<Deployment<'a, InMaintenance>> {
        self.branch.enable_maintenance(publisher).await?;
        Ok(self.transition(InMaintenance))
    }
}

impl<'a> Deployment<'a, InMaintenance> {
    /// Run the `maintenance` hook in the new checkout.
    ///
    /// On failure the branch stays in maintenance with the old pointer.
    pub async fn run_maintenance_hook(self) -> Result<Deployment<'a, Migrated>> {
        self.checkout
            .run_hook(self.branch, HookPoint::Maintenance)
            .await?;
        Ok(self.transition(Migrated))
    }
}

impl<'a> Deployment<'a, Migrated> {
    /// Persist the new checkout as current. Must precede leaving maintenance.
    pub fn swap(self) -> Result<Deployment<'a, Swapped>> {
        let branch = self.branch();
        branch
            .store()
            .set_active_checkout(branch.repo(), branch.name(), self.checkout().name())?;
        tracing::info!(
            repo = %branch.repo(),
            branch = %branch.name(),
            checkout = %self.checkout().name(),
            previous = ?self.previous().map(|c| c.name().to_string()),
            "switched current checkout"
        );
        Ok(self.transition(Swapped))
    }
}

impl<'a> Deployment<'a, Swapped> {
    pub async fn exit_maintenance(
        self,
        publisher: &dyn RoutingPublisher,
    ) -> Result<Deployment<'a, Live>> {
        self.branch.disable_maintenance(publisher).await?;
        Ok(self.transition(Live))
    }
}

impl<'a> Deployment<'a, Live> {
    /// Remove every checkout of the branch other than the new one.
    pub fn prune(self) -> Result<Deployment<'a, Completed>> {
        let mut pruned = Vec::new();
        for checkout in self.branch.checkouts()? {
            if checkout.name() != self.checkout.name() {
                checkout.remove()?;
                pruned.push(checkout.name().clone());
            }
        }
        Ok(self.transition(Completed::new(pruned)))
    }
}
