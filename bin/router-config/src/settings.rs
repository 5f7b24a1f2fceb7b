//! Settings read from ROUTER_* environment variables

use anyhow::{bail, Result};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// `KEY=VALUE` lines per source resource
    Env,
    /// Environment and nested configuration per source resource
    Json,
    /// JSON schema of the topology document
    Schema,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointSource {
    /// Endpoints listed in the topology document
    Static,
    /// Kubernetes `Endpoints` objects
    Kube,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub topology_path: PathBuf,
    pub output: OutputFormat,
    pub endpoints: EndpointSource,
    pub namespace: String,
    pub source: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let output = match lookup("ROUTER_OUTPUT").as_deref() {
            None | Some("env") => OutputFormat::Env,
            Some("json") => OutputFormat::Json,
            Some("schema") => OutputFormat::Schema,
            Some(other) => bail!("Unknown ROUTER_OUTPUT '{}', expected env, json or schema", other),
        };

        let endpoints = match lookup("ROUTER_ENDPOINTS").as_deref() {
            None | Some("static") => EndpointSource::Static,
            Some("kube") => EndpointSource::Kube,
            Some(other) => bail!("Unknown ROUTER_ENDPOINTS '{}', expected static or kube", other),
        };

        Ok(Self {
            topology_path: lookup("ROUTER_TOPOLOGY")
                .unwrap_or_else(|| "topology.yaml".to_string())
                .into(),
            output,
            endpoints,
            namespace: lookup("ROUTER_NAMESPACE").unwrap_or_else(|| "default".to_string()),
            source: lookup("ROUTER_SOURCE").filter(|s| !s.is_empty()),
        })
    }
}
