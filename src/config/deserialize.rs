// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Validates branch keys into BranchName.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::BranchConfig;
use crate::types::BranchName;

pub fn deserialize_branches<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<BranchName, BranchConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: BTreeMap<String, BranchConfig> = BTreeMap::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(name, config)| {
            BranchName::new(&name)
                .map(|name| (name, config))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}
