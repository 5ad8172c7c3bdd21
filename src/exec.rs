// ABOUTME: The one way wharf runs external commands.
// ABOUTME: Hooks, custom commands, builders, runners and git all go through here.

use snafu::{ResultExt, Snafu};
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Environment handed to a child process.
pub type Env = HashMap<String, String>;

/// Errors from running an external command.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CommandError {
    #[snafu(display("failed to start `{command}`: {source}"))]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display("`{command}` {}", describe_exit(*code)))]
    Failed { command: String, code: Option<i32> },
}

impl CommandError {
    /// Exit code of the failed command, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Failed { code, .. } => *code,
            CommandError::Spawn { .. } => None,
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

/// Overlay the branch environment with the environment of this process.
///
/// Keys present in both take the process value.
pub fn overlay_env(branch_env: &Env) -> Env {
    let mut env = branch_env.clone();
    env.extend(
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
    );
    env
}

/// Environment for git: only `PATH` survives.
///
/// Inside a receive hook git exports `GIT_DIR` and friends, which would
/// redirect a clone back at the bare repository. The pushed objects are still
/// quarantined at that point, so the quarantine directory is handed on as an
/// alternate object store.
pub fn git_env() -> Env {
    let mut env = Env::new();
    if let Ok(path) = std::env::var("PATH") {
        env.insert("PATH".to_string(), path);
    }
    if let Ok(quarantine) = std::env::var("GIT_QUARANTINE_PATH") {
        env.insert("GIT_ALTERNATE_OBJECT_DIRECTORIES".to_string(), quarantine);
    }
    env
}

/// Quote `value` as a single POSIX shell word.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn render(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

fn build(program: &str, args: &[&str], cwd: Option<&Path>, env: Option<&Env>) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::null());
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }
    if let Some(env) = env {
        cmd.env_clear().envs(env);
    }
    cmd
}

/// Run a program to completion with inherited output.
///
/// `env = None` inherits this process's environment unchanged.
pub async fn run(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    env: Option<&Env>,
) -> Result<(), CommandError> {
    let command = render(program, args);
    tracing::debug!(%command, cwd = ?cwd, "running command");

    let status = build(program, args, cwd, env)
        .status()
        .await
        .context(SpawnSnafu {
            command: command.clone(),
        })?;

    if status.success() {
        Ok(())
    } else {
        tracing::warn!(%command, code = ?status.code(), "command failed");
        FailedSnafu {
            command,
            code: status.code(),
        }
        .fail()
    }
}

/// Run a program wired to this process's stdin, for protocols spoken over it.
pub async fn run_attached(program: &str, args: &[&str]) -> Result<(), CommandError> {
    let command = render(program, args);
    tracing::debug!(%command, "running attached command");

    let status = build(program, args, None, None)
        .stdin(Stdio::inherit())
        .status()
        .await
        .context(SpawnSnafu {
            command: command.clone(),
        })?;

    if status.success() {
        Ok(())
    } else {
        FailedSnafu {
            command,
            code: status.code(),
        }
        .fail()
    }
}

/// Run a program and capture its standard output.
pub async fn output(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
) -> Result<String, CommandError> {
    let command = render(program, args);
    tracing::debug!(%command, "capturing command output");

    let output = build(program, args, cwd, None)
        .stderr(Stdio::inherit())
        .output()
        .await
        .context(SpawnSnafu {
            command: command.clone(),
        })?;

    if !output.status.success() {
        return FailedSnafu {
            command,
            code: output.status.code(),
        }
        .fail();
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run a shell command line in `cwd` with exactly `env`.
pub async fn run_shell(command: &str, cwd: &Path, env: &Env) -> Result<(), CommandError> {
    run("sh", &["-c", command], Some(cwd), Some(env)).await
}

/// Run git with a scrubbed environment.
pub async fn run_git(args: &[&str], cwd: Option<&Path>) -> Result<(), CommandError> {
    run("git", args, cwd, Some(&git_env())).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_env_wins_over_branch_env() {
        temp_env::with_var("WHARF_EXEC_TEST_VAR", Some("from-process"), || {
            let branch = Env::from([
                ("WHARF_EXEC_TEST_VAR".to_string(), "from-branch".to_string()),
                ("WHARF_ONLY_BRANCH".to_string(), "kept".to_string()),
            ]);
            let env = overlay_env(&branch);
            assert_eq!(env["WHARF_EXEC_TEST_VAR"], "from-process");
            assert_eq!(env["WHARF_ONLY_BRANCH"], "kept");
        });
    }

    #[test]
    fn git_env_keeps_only_path() {
        temp_env::with_vars(
            [
                ("GIT_DIR", Some("/tmp/elsewhere")),
                ("GIT_QUARANTINE_PATH", None),
            ],
            || {
                let env = git_env();
                assert!(!env.contains_key("GIT_DIR"));
                assert_eq!(env.get("PATH"), std::env::var("PATH").ok().as_ref());
                assert!(env.len() <= 1);
            },
        );
    }

    #[test]
    fn git_env_exposes_quarantined_objects() {
        temp_env::with_var(
            "GIT_QUARANTINE_PATH",
            Some("/srv/repos/shop/objects/incoming-x"),
            || {
                let env = git_env();
                assert_eq!(
                    env["GIT_ALTERNATE_OBJECT_DIRECTORIES"],
                    "/srv/repos/shop/objects/incoming-x"
                );
                assert!(!env.contains_key("GIT_QUARANTINE_PATH"));
            },
        );
    }

    #[test]
    fn quoting_survives_single_quotes() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[tokio::test]
    async fn shell_failure_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_shell("exit 3", dir.path(), &overlay_env(&Env::new()))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), Some(3));
        assert!(err.to_string().contains("exited with status 3"));
    }

    #[tokio::test]
    async fn shell_runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        run_shell("touch marker", dir.path(), &overlay_env(&Env::new()))
            .await
            .unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let err = run("wharf-definitely-not-a-program", &[], None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
        assert_eq!(err.exit_code(), None);
    }
}
