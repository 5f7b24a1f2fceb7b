use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::proxied_reference::ProxiedReferenceSpec;

/// Topology document describing the resources of a distributed application
/// and the proxied references between them
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopologySpec {
    /// Document version, must be `v1alpha1`
    pub api_version: String,

    /// Resources in declaration order
    #[serde(default)]
    pub resources: Vec<ResourceSpec>,

    /// Options for the generated reverse proxy configuration
    #[serde(default)]
    pub emitter: EmitterSpec,
}

/// A single resource in the topology
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    /// Unique resource name, used to derive route and cluster ids
    pub name: String,

    /// Endpoints already allocated to this resource
    #[serde(default)]
    pub endpoints: Vec<EndpointSpec>,

    /// Static environment entries
    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    /// Destinations this resource proxies to
    #[serde(default)]
    pub references: Vec<ProxiedReferenceSpec>,
}

/// An allocated endpoint
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct EndpointSpec {
    /// Binding name (e.g. "http")
    pub name: String,

    /// Full address including scheme, e.g. "http://10.0.0.5:8080"
    pub address: String,
}

/// Key layout of the flattened configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum KeyStyleSpec {
    /// `ReverseProxy__Routes__apiserviceRoute__ClusterId`
    #[default]
    Environment,
    /// `ReverseProxy.Routes.apiserviceRoute.ClusterId`
    Dotted,
}

/// How cluster destinations are named
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum DestinationNamingSpec {
    /// One destination per resource; later endpoints overwrite earlier ones
    #[default]
    Resource,
    /// One destination per endpoint, named `<resource>-<endpoint>`
    PerEndpoint,
}

/// Emitter options
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmitterSpec {
    /// Top-level configuration section, `null` for none
    #[serde(default = "default_section")]
    pub section: Option<String>,

    #[serde(default)]
    pub key_style: KeyStyleSpec,

    #[serde(default)]
    pub destination_naming: DestinationNamingSpec,
}

impl Default for EmitterSpec {
    fn default() -> Self {
        Self {
            section: default_section(),
            key_style: KeyStyleSpec::default(),
            destination_naming: DestinationNamingSpec::default(),
        }
    }
}

fn default_section() -> Option<String> {
    Some("ReverseProxy".to_string())
}
