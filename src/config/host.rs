// ABOUTME: Host-level configuration in config/wharf.yml.
// ABOUTME: Optional; a missing file means defaults.

use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    #[serde(default)]
    pub routing: RoutingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Shell command run after the routing manifest has been rewritten.
    #[serde(default)]
    pub reload: Option<String>,
}

impl HostConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        super::load_yaml(path)
    }
}
