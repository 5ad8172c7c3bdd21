// ABOUTME: Routing publisher: regenerates host-wide routing state after every transition.
// ABOUTME: The built-in publisher writes state/routes.json and runs an optional reload command.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::RoutingConfig;
use crate::error::Result;
use crate::exec::{self, Env};
use crate::repo::Repo;
use crate::store::{StateStore, write_atomic};

/// Rebuilds routing for every configured branch from current state.
#[async_trait]
pub trait RoutingPublisher: Send + Sync {
    async fn configure_all(&self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub generated_at: DateTime<Utc>,
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub repo: String,
    pub branch: String,
    /// Directory of the active checkout; `None` before the first deploy.
    pub checkout: Option<PathBuf>,
    pub maintenance: bool,
    pub runners: Vec<RouteRunner>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRunner {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Publishes routing as a JSON manifest for an external proxy to consume.
pub struct ManifestPublisher {
    store: StateStore,
    reload: Option<String>,
}

impl ManifestPublisher {
    pub fn new(store: StateStore, config: RoutingConfig) -> Self {
        Self {
            store,
            reload: config.reload,
        }
    }

    /// Current routing state of every configured branch.
    pub fn render(&self) -> Result<Manifest> {
        let mut routes = Vec::new();
        for repo in Repo::all(&self.store)? {
            for branch in repo.branches() {
                let checkout = branch.current_checkout()?;
                routes.push(Route {
                    repo: repo.name().to_string(),
                    branch: branch.name().to_string(),
                    checkout: checkout.map(|c| c.path().to_path_buf()),
                    maintenance: self.store.in_maintenance(repo.name(), branch.name()),
                    runners: branch
                        .runners()
                        .iter()
                        .map(|r| RouteRunner {
                            name: r.name().to_string(),
                            kind: r.kind().to_string(),
                        })
                        .collect(),
                });
            }
        }
        Ok(Manifest {
            generated_at: Utc::now(),
            routes,
        })
    }
}

#[async_trait]
impl RoutingPublisher for ManifestPublisher {
    async fn configure_all(&self) -> Result<()> {
        let manifest = self.render()?;
        let path = self.store.layout().routes_manifest();
        write_atomic(&path, &serde_json::to_vec_pretty(&manifest)?)?;
        tracing::debug!(path = %path.display(), routes = manifest.routes.len(), "routing manifest written");

        if let Some(reload) = &self.reload {
            let env = exec::overlay_env(&Env::new());
            exec::run_shell(reload, self.store.layout().base(), &env).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use std::fs;

    #[tokio::test]
    async fn writes_manifest_and_runs_reload() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        fs::create_dir_all(layout.repo_configs_dir()).unwrap();
        fs::write(
            layout.repo_configs_dir().join("shop.yml"),
            "branches:\n  main:\n    runners:\n      web:\n        type: Shell\n        start: 'true'\n        stop: 'true'\n",
        )
        .unwrap();

        let publisher = ManifestPublisher::new(
            StateStore::new(layout.clone()),
            RoutingConfig {
                reload: Some("touch reloaded".to_string()),
            },
        );
        publisher.configure_all().await.unwrap();

        let manifest: Manifest =
            serde_json::from_slice(&fs::read(layout.routes_manifest()).unwrap()).unwrap();
        assert_eq!(manifest.routes.len(), 1);
        let route = &manifest.routes[0];
        assert_eq!((route.repo.as_str(), route.branch.as_str()), ("shop", "main"));
        assert_eq!(route.checkout, None);
        assert!(!route.maintenance);
        assert_eq!(route.runners[0].kind, "Shell");
        assert!(dir.path().join("reloaded").exists());
    }
}
