// ABOUTME: Branch environment values with interpolation support.
// ABOUTME: Handles literal scalars and references to variables of the invoking process.

use crate::error::{Error, Result};
use crate::exec::Env;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    Number(serde_yaml::Number),
    Bool(bool),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    pub fn resolve(&self) -> Result<String> {
        match self {
            EnvValue::Literal(s) => Ok(s.clone()),
            EnvValue::Number(n) => Ok(n.to_string()),
            EnvValue::Bool(b) => Ok(b.to_string()),
            EnvValue::FromEnv { var, default } => match std::env::var(var) {
                Ok(val) => Ok(val),
                Err(_) => default
                    .clone()
                    .ok_or_else(|| Error::MissingEnvVar(var.clone())),
            },
        }
    }
}

pub fn resolve_env_map(map: &HashMap<String, EnvValue>) -> Result<Env> {
    map.iter()
        .map(|(k, v)| v.resolve().map(|resolved| (k.clone(), resolved)))
        .collect()
}
