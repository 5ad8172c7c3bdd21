// ABOUTME: Integration tests for the wharf CLI commands.
// ABOUTME: Validates help output, listing, and lock contention behavior.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

use support::Fixture;
use wharf::store::HostLock;
use wharf::types::{BranchName, CheckoutName, RepoName};

const SHOP: &str = r#"
branches:
  production:
    branch: master
    runners:
      web:
        type: SimpleProcess
        cmd: ./server
      worker:
        type: Shell
        start: ./worker start
        stop: ./worker stop
"#;

fn wharf_cmd(fixture: &Fixture) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wharf"));
    cmd.arg("--home").arg(fixture.home()).env_remove("WHARF_HOME");
    cmd
}

#[test]
fn help_shows_commands() {
    Command::new(assert_cmd::cargo::cargo_bin!("wharf"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("git-receive-pack"))
        .stdout(predicate::str::contains("git-pre-receive-hook"))
        .stdout(predicate::str::contains("rebuild"))
        .stdout(predicate::str::contains("rebuild-authorized-keys"))
        .stdout(predicate::str::contains("cleanup"));
}

#[test]
fn list_shows_branches_and_runners() {
    let fixture = Fixture::new();
    fixture.write_config("shop", SHOP);

    wharf_cmd(&fixture)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("shop:"))
        .stdout(predicate::str::contains("production [tracks master]: no checkout"))
        .stdout(predicate::str::contains("web (SimpleProcess)"))
        .stdout(predicate::str::contains("worker (Shell)"));
}

#[test]
fn list_does_not_need_the_lock() {
    let fixture = Fixture::new();
    fixture.write_config("shop", SHOP);
    let _held = HostLock::acquire(&fixture.layout.lock_file()).unwrap();

    wharf_cmd(&fixture).arg("list").assert().success();
}

#[test]
fn list_leaves_a_dangling_pointer_alone() {
    let fixture = Fixture::new();
    fixture.write_config("shop", SHOP);
    let repo = RepoName::new("shop").unwrap();
    let branch = BranchName::new("production").unwrap();
    let name = CheckoutName::parse("20240101_000000").unwrap();
    fixture.store().set_active_checkout(&repo, &branch, &name).unwrap();

    wharf_cmd(&fixture)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("production [tracks master]: no checkout"));

    assert_eq!(
        fixture.store().active_checkout(&repo, &branch).as_deref(),
        Some("20240101_000000")
    );
    assert!(fixture.layout.pointer_file(&repo, &branch).exists());
}

#[test]
fn busy_host_rejects_mutating_command_without_side_effects() {
    let fixture = Fixture::new();
    fixture.write_config("shop", SHOP);
    let lock_path = fixture.layout.lock_file();
    let _held = HostLock::acquire(&lock_path).unwrap();
    let before = fs::read(&lock_path).unwrap();

    wharf_cmd(&fixture)
        .args(["restart", "shop", "production"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("is already running"))
        .stderr(predicate::str::contains("Please try again later."));

    assert_eq!(fs::read(&lock_path).unwrap(), before);
    assert!(!fixture.layout.state_dir().exists());
}

#[test]
fn unknown_repo_fails() {
    let fixture = Fixture::new();

    wharf_cmd(&fixture)
        .args(["restart", "ghost", "main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: unknown repo: ghost"));
}

#[test]
fn pre_receive_rejects_tags() {
    let fixture = Fixture::new();
    fixture.write_config("shop", SHOP);

    wharf_cmd(&fixture)
        .args(["git-pre-receive-hook", "'shop'"])
        .write_stdin("aaaa bbbb refs/tags/v1\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Only branches are currently supported targets!",
        ));
}

#[test]
fn pre_receive_rejects_untracked_branch() {
    let fixture = Fixture::new();
    fixture.write_config("shop", SHOP);

    wharf_cmd(&fixture)
        .args(["git-pre-receive-hook", "shop"])
        .write_stdin("aaaa bbbb refs/heads/production\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("This branch is not configured!"));
}

#[test]
fn rebuild_skips_branches_without_checkout() {
    let fixture = Fixture::new();
    fixture.write_config("shop", SHOP);

    wharf_cmd(&fixture)
        .arg("rebuild")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "shop:production has no checkout. Skipping...",
        ));
}

#[test]
fn rebuild_authorized_keys_writes_forced_commands() {
    let fixture = Fixture::new();
    let keys = fixture.layout.ssh_keys_dir();
    fs::create_dir_all(&keys).unwrap();
    fs::write(keys.join("alice.pub"), "ssh-ed25519 AAAA alice\n").unwrap();
    let user_home = tempfile::tempdir().unwrap();

    wharf_cmd(&fixture)
        .env("HOME", user_home.path())
        .arg("rebuild-authorized-keys")
        .assert()
        .success();

    let written = fs::read_to_string(user_home.path().join(".ssh/authorized_keys")).unwrap();
    assert!(written.contains("$SSH_ORIGINAL_COMMAND\",no-agent-forwarding"));
    assert!(written.trim_end().ends_with("ssh-ed25519 AAAA alice"));
}
