//! Reverse proxy configuration snapshot and its flat key/value form

use crate::{Result, Transform};
use serde::Serialize;
use std::collections::BTreeMap;

/// Routes and clusters derived for one source resource
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigurationSnapshot {
    pub routes: BTreeMap<String, RouteConfig>,
    pub clusters: BTreeMap<String, ClusterConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteConfig {
    pub cluster_id: String,
    pub r#match: RouteMatch,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<Transform>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteMatch {
    pub path: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClusterConfig {
    pub destinations: BTreeMap<String, DestinationConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DestinationConfig {
    pub address: String,
}

/// Separator layout of flattened keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyStyle {
    /// `Section__Routes__apiRoute__Transforms__0__PathPattern`
    #[default]
    Environment,
    /// `Section.Routes.apiRoute.Transforms[0].PathPattern`
    Dotted,
}

/// Layout of flattened configuration keys
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyFormat {
    pub section: Option<String>,
    pub style: KeyStyle,
}

impl Default for KeyFormat {
    fn default() -> Self {
        Self {
            section: Some("ReverseProxy".to_string()),
            style: KeyStyle::Environment,
        }
    }
}

enum Segment<'a> {
    Name(&'a str),
    Index(usize),
}

impl KeyFormat {
    fn key(&self, segments: &[Segment<'_>]) -> String {
        let mut key = String::new();
        let section = self.section.as_deref().map(Segment::Name);

        for segment in section.iter().chain(segments) {
            match (self.style, segment) {
                (KeyStyle::Environment, Segment::Name(name)) => push_part(&mut key, "__", name),
                (KeyStyle::Environment, Segment::Index(i)) => push_part(&mut key, "__", &i.to_string()),
                (KeyStyle::Dotted, Segment::Name(name)) => push_part(&mut key, ".", name),
                (KeyStyle::Dotted, Segment::Index(i)) => key.push_str(&format!("[{}]", i)),
            }
        }
        key
    }
}

fn push_part(key: &mut String, separator: &str, part: &str) {
    if !key.is_empty() {
        key.push_str(separator);
    }
    key.push_str(part);
}

impl ConfigurationSnapshot {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.clusters.is_empty()
    }

    /// Flatten into key/value pairs. Clusters without destinations have no
    /// values and therefore no keys.
    pub fn flatten(&self, format: &KeyFormat) -> BTreeMap<String, String> {
        use Segment::{Index, Name};

        let mut entries = BTreeMap::new();

        for (route_name, route) in &self.routes {
            entries.insert(
                format.key(&[Name("Routes"), Name(route_name), Name("ClusterId")]),
                route.cluster_id.clone(),
            );
            entries.insert(
                format.key(&[Name("Routes"), Name(route_name), Name("Match"), Name("Path")]),
                route.r#match.path.clone(),
            );
            for (i, transform) in route.transforms.iter().enumerate() {
                entries.insert(
                    format.key(&[
                        Name("Routes"),
                        Name(route_name),
                        Name("Transforms"),
                        Index(i),
                        Name(transform.key()),
                    ]),
                    transform.value().to_string(),
                );
            }
        }

        for (cluster_id, cluster) in &self.clusters {
            for (destination, config) in &cluster.destinations {
                entries.insert(
                    format.key(&[
                        Name("Clusters"),
                        Name(cluster_id),
                        Name("Destinations"),
                        Name(destination),
                        Name("Address"),
                    ]),
                    config.address.clone(),
                );
            }
        }

        entries
    }

    /// Nested JSON form, optionally wrapped in a top-level section
    pub fn to_json(&self, section: Option<&str>) -> Result<serde_json::Value> {
        let value = serde_json::to_value(self)?;
        Ok(match section {
            Some(section) => {
                let mut wrapped = serde_json::Map::new();
                wrapped.insert(section.to_string(), value);
                serde_json::Value::Object(wrapped)
            }
            None => value,
        })
    }
}
