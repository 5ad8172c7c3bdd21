// ABOUTME: Build-tool adapters run between the before_build and build hooks.
// ABOUTME: Each builder decides from the checkout contents whether it applies.

mod npm;

pub use npm::{Bower, Npm};

use async_trait::async_trait;

use crate::checkout::Checkout;
use crate::error::Result;
use crate::exec::Env;

/// A language toolchain step detected from files in the checkout.
#[async_trait]
pub trait Builder: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_applicable(&self, checkout: &Checkout) -> bool;

    /// Run the build step with the branch's command environment.
    async fn build(&self, checkout: &Checkout, env: &Env) -> Result<()>;
}

/// The built-in builders, in the order they run.
pub fn default_builders() -> Vec<Box<dyn Builder>> {
    vec![Box::new(Npm), Box::new(Bower)]
}
