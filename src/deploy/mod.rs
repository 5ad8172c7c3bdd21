// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Exports state markers and the Deployment struct for compile-time ordered deploys.

mod deployment;
mod state;
mod transitions;

pub use deployment::Deployment;
pub use state::{Built, Completed, Created, InMaintenance, Live, Migrated, Swapped};
