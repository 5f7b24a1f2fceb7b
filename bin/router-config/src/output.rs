//! Rendering of materialized configuration

use anyhow::Result;
use router_core::{Resource, Topology};
use std::fmt::Write;

/// `KEY=VALUE` lines, one block per source resource
pub fn render_env(topology: &Topology, sources: &[Resource]) -> Result<String> {
    let mut out = String::new();
    for source in sources {
        writeln!(out, "# {}", source)?;
        for (key, value) in topology.materialize_environment(source)? {
            writeln!(out, "{}={}", key, value)?;
        }
    }
    Ok(out)
}

/// JSON object keyed by source resource with its flat environment and the
/// nested reverse proxy configuration
pub fn render_json(topology: &Topology, sources: &[Resource]) -> Result<String> {
    let section = topology.options().key_format.section.as_deref();
    let mut document = serde_json::Map::new();
    for source in sources {
        let environment = topology.materialize_environment(source)?;
        let configuration = topology.snapshot(source)?.to_json(section)?;
        document.insert(
            source.to_string(),
            serde_json::json!({
                "environment": environment,
                "configuration": configuration,
            }),
        );
    }
    Ok(serde_json::to_string_pretty(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_core::{Endpoint, InMemoryEndpointRegistry, PathRule};
    use std::sync::Arc;

    fn weather() -> (Topology, Resource) {
        let registry = InMemoryEndpointRegistry::new();
        let mut topology = Topology::new(Arc::new(registry.clone()));
        let api = topology.add_resource("apiservice").unwrap().resource().clone();
        let proxy = topology.add_resource("reverseproxy").unwrap().resource().clone();
        registry
            .allocate(&api, Endpoint::new("http", "http://10.0.0.5:8080"))
            .unwrap();
        topology
            .resource(&proxy)
            .unwrap()
            .with_proxied_reference(&api, PathRule::prefix_match("/weather").unwrap(), None)
            .unwrap();
        (topology, proxy)
    }

    #[test]
    fn test_render_env() {
        let (topology, proxy) = weather();
        let out = render_env(&topology, &[proxy]).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "# reverseproxy");
        assert!(lines.contains(&"ReverseProxy__Routes__apiserviceRoute__Match__Path=/weather"));
        assert!(lines.contains(
            &"ReverseProxy__Clusters__apiserviceCluster__Destinations__apiservice__Address=http://10.0.0.5:8080"
        ));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_render_json() {
        let (topology, proxy) = weather();
        let out = render_json(&topology, &[proxy]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let proxy = &value["reverseproxy"];
        assert_eq!(
            proxy["configuration"]["ReverseProxy"]["Routes"]["apiserviceRoute"]["ClusterId"],
            "apiserviceCluster"
        );
        assert_eq!(
            proxy["environment"]["ReverseProxy__Routes__apiserviceRoute__ClusterId"],
            "apiserviceCluster"
        );
    }
}
