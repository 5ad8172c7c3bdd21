// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wharf")]
#[command(about = "Push-to-deploy orchestrator for a single host")]
#[command(version)]
pub struct Cli {
    /// Base directory holding repos, config, state and checkouts [default: $HOME]
    #[arg(long, global = true, env = "WHARF_HOME")]
    pub home: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print results and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve a git push (SSH forced command)
    #[command(name = "git-receive-pack")]
    GitReceivePack {
        /// Repo name, optionally wrapped in single quotes
        repo: String,
    },

    /// Deploy pushed branches (invoked by the repo's pre-receive hook)
    #[command(name = "git-pre-receive-hook")]
    GitPreReceiveHook { repo: String },

    /// Redeploy the current commit of one branch, or of every branch
    Rebuild {
        #[arg(requires = "branch")]
        repo: Option<String>,
        branch: Option<String>,
    },

    /// Restart a branch's runners on its current checkout
    Restart { repo: String, branch: String },

    /// Run a configured custom command in a branch's current checkout
    Run {
        repo: String,
        branch: String,
        /// Name from the branch's custom_cmds
        cmd: String,
    },

    /// List repos, branches, runners and current checkouts
    List,

    /// Stop and delete service directories no runner owns anymore
    Cleanup,

    /// Regenerate ~/.ssh/authorized_keys from config/ssh_keys
    #[command(name = "rebuild-authorized-keys", alias = "rebuild_authorized_keys")]
    RebuildAuthorizedKeys,
}
