// ABOUTME: Deployment state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce the deploy step order at compile time.

use crate::types::CheckoutName;

/// Checkout cloned and stripped, not yet built.
/// Available actions: `build()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Created;

/// Checkout built; the old checkout is still serving.
/// Available actions: `enter_maintenance()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Built;

/// Runners stopped and routing republished.
/// Available actions: `run_maintenance_hook()`
#[derive(Debug, Clone, Copy, Default)]
pub struct InMaintenance;

/// Maintenance hook succeeded against the new checkout.
/// Available actions: `swap()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Migrated;

/// Pointer persisted: the new checkout is current.
/// Available actions: `exit_maintenance()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Swapped;

/// Runners serving the new checkout.
/// Available actions: `prune()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Live;

/// Completed: every other checkout of the branch removed.
/// Available actions: `finish()`
#[derive(Debug, Clone, Default)]
pub struct Completed {
    pruned: Vec<CheckoutName>,
}

impl Completed {
    pub fn new(pruned: Vec<CheckoutName>) -> Self {
        Self { pruned }
    }

    /// Names of the checkouts removed while pruning.
    pub fn pruned(&self) -> &[CheckoutName] {
        &self.pruned
    }
}
