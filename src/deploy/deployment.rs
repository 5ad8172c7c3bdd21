// ABOUTME: Generic deployment struct parameterized by state marker.
// ABOUTME: Borrows the branch being deployed and owns the new checkout.

use crate::branch::Branch;
use crate::checkout::Checkout;
use crate::error::Result;
use crate::types::{CheckoutName, CommitId};

use super::state::{Completed, Created};

/// A deployment in progress, parameterized by its current state.
///
/// Each transition consumes the deployment; a failed step drops it, which
/// leaves on-disk state exactly where that step stopped. Nothing is rolled back.
pub struct Deployment<'a, S> {
    pub(crate) branch: &'a Branch,
    pub(crate) checkout: Checkout,
    pub(crate) previous: Option<Checkout>,
    pub(crate) state: S,
}

impl<'a> Deployment<'a, Created> {
    /// Clone `commit` into a new checkout of `branch`.
    pub async fn create(branch: &'a Branch, commit: &CommitId) -> Result<Self> {
        let previous = branch.current_checkout()?;
        let checkout = Checkout::create(branch, commit).await?;
        Ok(Deployment {
            branch,
            checkout,
            previous,
            state: Created,
        })
    }
}

impl<S> Deployment<'_, S> {
    pub fn branch(&self) -> &Branch {
        self.branch
    }

    /// The checkout being deployed.
    pub fn checkout(&self) -> &Checkout {
        &self.checkout
    }

    /// The checkout that was current when the deployment started.
    pub fn previous(&self) -> Option<&Checkout> {
        self.previous.as_ref()
    }
}

impl Deployment<'_, Completed> {
    pub fn pruned(&self) -> &[CheckoutName] {
        self.state.pruned()
    }

    /// Finish the deployment, returning the now-current checkout.
    pub fn finish(self) -> Checkout {
        self.checkout
    }
}
