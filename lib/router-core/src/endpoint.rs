//! Resources and the endpoints allocated to them
use crate::{CoreError, Result};
use std::fmt;

/// Identity of a resource in the topology
///
/// The name is embedded in configuration keys, so it is restricted to ASCII
/// alphanumerics, `-` and `_`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resource {
    name: String,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CoreError::InvalidResourceName(name));
        }
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the route generated for this resource as a destination
    pub fn route_name(&self) -> String {
        format!("{}Route", self.name)
    }

    /// Id of the cluster generated for this resource as a destination
    pub fn cluster_id(&self) -> String {
        format!("{}Cluster", self.name)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A named network address allocated to a resource
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub address: String,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Build an endpoint from its scheme, host and allocated port
    pub fn allocated(name: impl Into<String>, scheme: &str, host: &str, port: u16) -> Self {
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]", host)
        } else {
            host.to_string()
        };
        Self::new(name, format!("{}://{}:{}", scheme, host, port))
    }
}
