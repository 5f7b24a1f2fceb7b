use anyhow::{Context, Result};
use kube::Client;
use router_api::TopologySpec;
use router_core::{EndpointRegistry, InMemoryEndpointRegistry, Resource, Topology};
use router_kube::KubeEndpointRegistry;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod output;
mod settings;

use settings::{EndpointSource, OutputFormat, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries only configuration output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env()?;

    let rendered = match settings.output {
        OutputFormat::Schema => serde_json::to_string_pretty(&schemars::schema_for!(TopologySpec))?,
        OutputFormat::Env | OutputFormat::Json => {
            let topology = load_topology(&settings).await?;
            let sources = select_sources(&topology, settings.source.as_deref())?;
            debug!("Materializing {} source resources", sources.len());

            if settings.output == OutputFormat::Json {
                output::render_json(&topology, &sources)?
            } else {
                output::render_env(&topology, &sources)?
            }
        }
    };
    print!("{}", rendered);

    Ok(())
}

async fn load_topology(settings: &Settings) -> Result<Topology> {
    info!("Loading topology from {}", settings.topology_path.display());
    let document = std::fs::read_to_string(&settings.topology_path)
        .with_context(|| format!("Failed to read {}", settings.topology_path.display()))?;
    let spec: TopologySpec = serde_yaml::from_str(&document)
        .with_context(|| format!("Failed to parse {}", settings.topology_path.display()))?;

    let registry: Arc<dyn EndpointRegistry> = match settings.endpoints {
        EndpointSource::Static => Arc::new(InMemoryEndpointRegistry::from_spec(&spec)?),
        EndpointSource::Kube => {
            let client = Client::try_default().await?;
            Arc::new(KubeEndpointRegistry::start(client, &settings.namespace).await?)
        }
    };
    info!("Endpoint source: {:?}", settings.endpoints);

    Ok(Topology::from_spec(&spec, registry)?)
}

/// The requested source, or every resource that declares proxied references
fn select_sources(topology: &Topology, requested: Option<&str>) -> Result<Vec<Resource>> {
    if let Some(name) = requested {
        let resource = Resource::new(name)?;
        if !topology.contains(&resource) {
            anyhow::bail!("Source resource '{}' is not declared in the topology", name);
        }
        return Ok(vec![resource]);
    }

    Ok(topology
        .resources()
        .filter(|resource| {
            topology
                .populators(resource)
                .map(|populators| !populators.is_empty())
                .unwrap_or(false)
        })
        .cloned()
        .collect())
}
