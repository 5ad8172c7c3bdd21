// ABOUTME: Test support utilities.
// ABOUTME: Temporary wharf homes, git fixtures, and recording runners and publishers.

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex, Once};
use tempfile::TempDir;

use wharf::branch::Branch;
use wharf::error::Result;
use wharf::host::Host;
use wharf::layout::Layout;
use wharf::output::{Output, OutputMode};
use wharf::routing::RoutingPublisher;
use wharf::runner::Runner;
use wharf::store::StateStore;
use wharf::types::{CommitId, RepoName};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("wharf=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Ordered record of runner and publisher calls shared between fakes.
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// A throwaway wharf home.
pub struct Fixture {
    pub dir: TempDir,
    pub layout: Layout,
}

// Each test binary only uses some of these helpers, so allow dead_code.
#[allow(dead_code)]
impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        Self { dir, layout }
    }

    pub fn home(&self) -> &Path {
        self.dir.path()
    }

    pub fn store(&self) -> StateStore {
        StateStore::new(self.layout.clone())
    }

    pub fn write_config(&self, repo: &str, yaml: &str) {
        let dir = self.layout.repo_configs_dir();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{repo}.yml")), yaml).unwrap();
    }

    /// Host with no builders, quiet output and a recording publisher.
    pub fn host(&self, log: &EventLog) -> Host {
        Host::with_parts(
            self.store(),
            Box::new(RecordingPublisher::new(self.store(), log.clone())),
            Vec::new(),
            Output::new(OutputMode::Quiet),
        )
    }

    /// Create the bare repo for `repo` and a scratch clone to commit from.
    pub fn git_repo(&self, repo: &str) -> GitFixture {
        let bare = self.layout.repo_path(&RepoName::new(repo).unwrap());
        fs::create_dir_all(&bare).unwrap();
        git(&bare, &["init", "--bare", "-q"]);
        git(&bare, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        let work = self.dir.path().join(format!("work-{repo}"));
        fs::create_dir_all(&work).unwrap();
        git(&work, &["init", "-q"]);
        git(&work, &["config", "user.email", "dev@example.com"]);
        git(&work, &["config", "user.name", "Dev"]);
        git(&work, &["config", "commit.gpgsign", "false"]);
        GitFixture { bare, work }
    }
}

/// A bare repository plus a working clone that pushes into it.
pub struct GitFixture {
    pub bare: PathBuf,
    pub work: PathBuf,
}

#[allow(dead_code)]
impl GitFixture {
    /// Commit `files` and push them to `branch`. Returns the new commit.
    pub fn commit(&self, branch: &str, files: &[(&str, &str)]) -> CommitId {
        for (name, content) in files {
            let path = self.work.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, content).unwrap();
        }
        git(&self.work, &["add", "-A"]);
        git(&self.work, &["commit", "-q", "--allow-empty", "-m", "change"]);
        let bare = self.bare.to_string_lossy().into_owned();
        let refspec = format!("HEAD:refs/heads/{branch}");
        git(&self.work, &["push", "-q", &bare, &refspec]);
        CommitId::new(&git_output(&self.work, &["rev-parse", "HEAD"])).unwrap()
    }
}

pub fn git(cwd: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed in {}", cwd.display());
}

pub fn git_output(cwd: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .unwrap();
    assert!(output.status.success(), "git {args:?} failed");
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

/// Runner that records its transitions and the checkout it would serve.
pub struct RecordingRunner {
    name: String,
    log: EventLog,
}

#[allow(dead_code)]
impl RecordingRunner {
    pub fn boxed(name: &str, log: &EventLog) -> Box<dyn Runner> {
        Box::new(Self {
            name: name.to_string(),
            log: log.clone(),
        })
    }
}

#[async_trait]
impl Runner for RecordingRunner {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "Recording"
    }

    async fn enable_maintenance(&self, _branch: &Branch) -> Result<()> {
        self.log.lock().unwrap().push(format!("enable:{}", self.name));
        Ok(())
    }

    async fn disable_maintenance(&self, branch: &Branch) -> Result<()> {
        let current = branch
            .current_checkout()?
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| "none".to_string());
        self.log
            .lock()
            .unwrap()
            .push(format!("disable:{}:{current}", self.name));
        Ok(())
    }
}

/// Publisher that records each call and whether any branch is in maintenance.
pub struct RecordingPublisher {
    store: StateStore,
    log: EventLog,
}

impl RecordingPublisher {
    pub fn new(store: StateStore, log: EventLog) -> Self {
        Self { store, log }
    }
}

#[async_trait]
impl RoutingPublisher for RecordingPublisher {
    async fn configure_all(&self) -> Result<()> {
        let maintenance = has_marker(&self.store.layout().state_dir());
        self.log
            .lock()
            .unwrap()
            .push(format!("publish:maintenance={maintenance}"));
        Ok(())
    }
}

fn has_marker(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|entry| {
        let path = entry.path();
        if path.is_dir() {
            has_marker(&path)
        } else {
            entry.file_name() == "maintenance"
        }
    })
}

#[allow(dead_code)]
pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}
