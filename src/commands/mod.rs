// ABOUTME: Command module aggregator for the wharf CLI.
// ABOUTME: One handler per subcommand; mutating handlers take the host lock first.

mod keys;
mod list;
mod maintenance;
mod push;
mod rebuild;

pub use keys::rebuild_authorized_keys;
pub use list::list;
pub use maintenance::{cleanup, restart, run_custom};
pub use push::{git_pre_receive_hook, git_receive_pack};
pub use rebuild::rebuild;
