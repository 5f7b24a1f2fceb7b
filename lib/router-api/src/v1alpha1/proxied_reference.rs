use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declares that the owning resource proxies requests to `destination`
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProxiedReferenceSpec {
    /// Name of the destination resource
    pub destination: String,

    /// How incoming paths are matched and rewritten
    pub rule: PathRuleSpec,

    /// Expose only this endpoint of the destination.
    /// If not specified, all endpoints are exposed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
}

/// Path matching strategy, selected by its `type` field
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PathRuleSpec {
    /// Route paths starting with `matchPath`, forwarding the remainder
    #[serde(rename_all = "camelCase")]
    PrefixMatch {
        match_path: String,

        /// Rewrite pattern, defaults to `/{remainder}`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path_pattern: Option<String>,
    },

    /// Route paths under `prefix`, optionally removing it before forwarding
    #[serde(rename_all = "camelCase")]
    StripPrefix {
        prefix: String,

        #[serde(default)]
        strip_prefix: bool,
    },
}
