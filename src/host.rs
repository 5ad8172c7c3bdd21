// ABOUTME: Host context shared by every command: state store, routing, builders, output.
// ABOUTME: Built once per invocation from the host layout and config/wharf.yml.

use crate::builders::{Builder, default_builders};
use crate::config::HostConfig;
use crate::error::Result;
use crate::layout::Layout;
use crate::output::Output;
use crate::repo::Repo;
use crate::routing::{ManifestPublisher, RoutingPublisher};
use crate::store::{HostLock, StateStore};
use crate::types::RepoName;

pub struct Host {
    store: StateStore,
    publisher: Box<dyn RoutingPublisher>,
    builders: Vec<Box<dyn Builder>>,
    output: Output,
}

impl Host {
    /// Open the host rooted at `layout` with the built-in publisher and builders.
    pub fn open(layout: Layout, output: Output) -> Result<Self> {
        let config = HostConfig::load(&layout.host_config())?;
        let store = StateStore::new(layout);
        let publisher = ManifestPublisher::new(store.clone(), config.routing);
        Ok(Self::with_parts(
            store,
            Box::new(publisher),
            default_builders(),
            output,
        ))
    }

    pub fn with_parts(
        store: StateStore,
        publisher: Box<dyn RoutingPublisher>,
        builders: Vec<Box<dyn Builder>>,
        output: Output,
    ) -> Self {
        Self {
            store,
            publisher,
            builders,
            output,
        }
    }

    pub fn layout(&self) -> &Layout {
        self.store.layout()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn publisher(&self) -> &dyn RoutingPublisher {
        self.publisher.as_ref()
    }

    pub fn builders(&self) -> &[Box<dyn Builder>] {
        &self.builders
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Take the host lock. Every mutating command holds it for its whole run.
    pub fn lock(&self) -> Result<HostLock> {
        self.store.lock()
    }

    pub fn repo(&self, name: &RepoName) -> Result<Repo> {
        Repo::open(&self.store, name)
    }

    pub fn repos(&self) -> Result<Vec<Repo>> {
        Repo::all(&self.store)
    }
}
