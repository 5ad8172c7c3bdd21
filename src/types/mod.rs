// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: Repo and branch names, commit ids, and checkout creation names.

mod checkout_name;
mod commit;
mod name;

pub use checkout_name::{CheckoutName, CheckoutNameError};
pub use commit::{CommitId, CommitIdError, SHORT_COMMIT_LEN};
pub use name::{BranchName, NameError, RepoName};
