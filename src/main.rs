// ABOUTME: Entry point for the wharf CLI application.
// ABOUTME: Parses arguments, sets up logging and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wharf::error::{Error, ErrorKind, IoResultExt, Result};
use wharf::host::Host;
use wharf::layout::Layout;
use wharf::output::{Output, OutputMode};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli, mode).await {
        match e.kind() {
            ErrorKind::Busy => eprintln!("{e}"),
            _ => Output::new(mode).error(&e.to_string()),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let home = cli
        .home
        .or_else(|| env::var_os("HOME").map(PathBuf::from))
        .ok_or(Error::NoHome)?;

    let mut output = Output::new(mode);
    output.start_timer();
    let host = Host::open(Layout::new(home), output)?;

    match cli.command {
        Commands::GitReceivePack { repo } => {
            commands::git_receive_pack(&host, &repo, &current_exe()?).await
        }
        Commands::GitPreReceiveHook { repo } => commands::git_pre_receive_hook(&host, &repo).await,
        Commands::Rebuild { repo, branch } => {
            commands::rebuild(&host, repo.as_deref(), branch.as_deref()).await
        }
        Commands::Restart { repo, branch } => commands::restart(&host, &repo, &branch).await,
        Commands::Run { repo, branch, cmd } => {
            commands::run_custom(&host, &repo, &branch, &cmd).await
        }
        Commands::List => commands::list(&host),
        Commands::Cleanup => commands::cleanup(&host).await,
        Commands::RebuildAuthorizedKeys => {
            let user_home = env::var_os("HOME").map(PathBuf::from).ok_or(Error::NoHome)?;
            let authorized_keys = user_home.join(".ssh").join("authorized_keys");
            commands::rebuild_authorized_keys(&host, &current_exe()?, &authorized_keys)
        }
    }
}

fn current_exe() -> Result<PathBuf> {
    env::current_exe().at_path(Path::new("/proc/self/exe"))
}
