// ABOUTME: JavaScript package installers: npm and bower.
// ABOUTME: Applicable when the checkout root carries the tool's manifest.

use async_trait::async_trait;

use super::Builder;
use crate::checkout::Checkout;
use crate::error::Result;
use crate::exec::{self, Env};

/// npm leaves these behind when an install is interrupted.
const NPM_TMP_CLEANUP: &str = "rm -rf /tmp/npm-*";

pub struct Npm;

#[async_trait]
impl Builder for Npm {
    fn name(&self) -> &'static str {
        "npm"
    }

    fn is_applicable(&self, checkout: &Checkout) -> bool {
        checkout.path().join("package.json").is_file()
    }

    async fn build(&self, checkout: &Checkout, env: &Env) -> Result<()> {
        let cwd = checkout.path();
        exec::run_shell(NPM_TMP_CLEANUP, cwd, env).await?;
        exec::run("npm", &["install"], Some(cwd), Some(env)).await?;
        exec::run_shell(NPM_TMP_CLEANUP, cwd, env).await?;
        Ok(())
    }
}

pub struct Bower;

#[async_trait]
impl Builder for Bower {
    fn name(&self) -> &'static str {
        "bower"
    }

    fn is_applicable(&self, checkout: &Checkout) -> bool {
        checkout.path().join("bower.json").is_file()
    }

    async fn build(&self, checkout: &Checkout, env: &Env) -> Result<()> {
        exec::run("bower", &["install"], Some(checkout.path()), Some(env)).await?;
        Ok(())
    }
}
