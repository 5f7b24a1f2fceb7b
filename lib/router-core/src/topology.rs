//! Resource graph host: declared resources, their environment surfaces, and
//! materialization of proxied-reference configuration

use crate::binding::ResourceBuilder;
use crate::emitter::{ConfigurationEmitter, DestinationNaming, EmitterOptions};
use crate::rule::DEFAULT_PATH_PATTERN;
use crate::snapshot::{ConfigurationSnapshot, KeyFormat, KeyStyle};
use crate::{CoreError, Endpoint, EndpointRegistry, PathRule, ReferenceTable, Resource, Result};
use router_api::v1alpha1::{
    DestinationNamingSpec, EmitterSpec, KeyStyleSpec, PathRuleSpec, TopologySpec, API_VERSION,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Callback run when a resource's environment is materialized
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Populator {
    /// Emit reverse proxy configuration for the resource's proxied references
    ProxiedReferences,
}

/// Environment/configuration surface of a resource
#[derive(Clone, Debug, Default)]
pub(crate) struct EnvironmentSurface {
    pub(crate) variables: BTreeMap<String, String>,
    populators: Vec<Populator>,
}

/// Topology of a distributed application
pub struct Topology {
    resources: BTreeMap<Resource, EnvironmentSurface>,
    pub(crate) references: ReferenceTable,
    registry: Arc<dyn EndpointRegistry>,
    options: EmitterOptions,
}

impl Topology {
    pub fn new(registry: Arc<dyn EndpointRegistry>) -> Self {
        Self {
            resources: BTreeMap::new(),
            references: ReferenceTable::new(),
            registry,
            options: EmitterOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EmitterOptions) -> Self {
        self.options = options;
        self
    }

    /// Build a topology from a declarative document. Endpoints listed in the
    /// document are not allocated here, see
    /// [`crate::InMemoryEndpointRegistry::from_spec`].
    pub fn from_spec(spec: &TopologySpec, registry: Arc<dyn EndpointRegistry>) -> Result<Self> {
        if spec.api_version != API_VERSION {
            return Err(CoreError::UnsupportedApiVersion(spec.api_version.clone()));
        }

        let mut topology = Topology::new(registry).with_options(emitter_options(&spec.emitter));

        // Declare every resource first so references may point forward
        for resource_spec in &spec.resources {
            let mut builder = topology.add_resource(&resource_spec.name)?;
            for (key, value) in &resource_spec.environment {
                builder.with_environment(key.as_str(), value.as_str());
            }
        }

        for resource_spec in &spec.resources {
            let source = Resource::new(resource_spec.name.as_str())?;
            for reference in &resource_spec.references {
                let destination = Resource::new(reference.destination.as_str())?;
                topology.resource(&source)?.with_proxied_reference(
                    &destination,
                    path_rule(&reference.rule)?,
                    reference.binding.as_deref(),
                )?;
            }
        }

        info!(
            "Loaded topology with {} resources and {} proxied references",
            topology.resources.len(),
            topology.references.len()
        );
        Ok(topology)
    }

    /// Declare a new resource
    pub fn add_resource(&mut self, name: &str) -> Result<ResourceBuilder<'_>> {
        let resource = Resource::new(name)?;
        if self.resources.contains_key(&resource) {
            return Err(CoreError::DuplicateResource(resource.to_string()));
        }
        self.resources.insert(resource.clone(), EnvironmentSurface::default());
        debug!("Declared resource: {}", resource);
        Ok(ResourceBuilder::new(self, resource))
    }

    /// Builder for an already declared resource
    pub fn resource(&mut self, resource: &Resource) -> Result<ResourceBuilder<'_>> {
        if !self.contains(resource) {
            return Err(CoreError::ResourceNotFound(resource.to_string()));
        }
        Ok(ResourceBuilder::new(self, resource.clone()))
    }

    /// Remove a resource from the topology. References to it are kept and
    /// emit clusters without destinations.
    pub fn remove_resource(&mut self, resource: &Resource) -> Result<()> {
        if self.resources.remove(resource).is_none() {
            return Err(CoreError::ResourceNotFound(resource.to_string()));
        }
        debug!("Removed resource: {}", resource);
        Ok(())
    }

    pub fn contains(&self, resource: &Resource) -> bool {
        self.resources.contains_key(resource)
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.keys()
    }

    pub fn references(&self) -> &ReferenceTable {
        &self.references
    }

    pub fn options(&self) -> &EmitterOptions {
        &self.options
    }

    pub fn populators(&self, resource: &Resource) -> Result<&[Populator]> {
        self.resources
            .get(resource)
            .map(|surface| surface.populators.as_slice())
            .ok_or_else(|| CoreError::ResourceNotFound(resource.to_string()))
    }

    /// Configuration snapshot for `source` against the current endpoints
    pub fn snapshot(&self, source: &Resource) -> Result<ConfigurationSnapshot> {
        if !self.contains(source) {
            return Err(CoreError::ResourceNotFound(source.to_string()));
        }
        let declared = DeclaredEndpoints { topology: self };
        Ok(ConfigurationEmitter::new(&self.references, &declared, &self.options).emit(source))
    }

    /// Materialize the environment of `resource`: its static entries plus the
    /// output of every installed populator
    pub fn materialize_environment(&self, resource: &Resource) -> Result<BTreeMap<String, String>> {
        let surface = self
            .resources
            .get(resource)
            .ok_or_else(|| CoreError::ResourceNotFound(resource.to_string()))?;

        let mut environment = surface.variables.clone();
        for populator in &surface.populators {
            match populator {
                Populator::ProxiedReferences => {
                    let declared = DeclaredEndpoints { topology: self };
                    let emitter = ConfigurationEmitter::new(&self.references, &declared, &self.options);
                    environment.extend(emitter.emit_environment(resource));
                }
            }
        }
        Ok(environment)
    }

    pub(crate) fn surface_mut(&mut self, resource: &Resource) -> &mut EnvironmentSurface {
        self.resources.entry(resource.clone()).or_default()
    }

    pub(crate) fn install_populator(&mut self, resource: &Resource, populator: Populator) {
        let surface = self.surface_mut(resource);
        if !surface.populators.contains(&populator) {
            surface.populators.push(populator);
            debug!("Installed {:?} populator on {}", populator, resource);
        }
    }
}

/// Registry view that resolves only resources still declared in the topology.
/// A declared resource without allocations has no endpoints yet.
struct DeclaredEndpoints<'a> {
    topology: &'a Topology,
}

impl EndpointRegistry for DeclaredEndpoints<'_> {
    fn endpoints(&self, resource: &Resource) -> Result<Vec<Endpoint>> {
        if !self.topology.contains(resource) {
            return Err(CoreError::UnresolvedDestination(resource.to_string()));
        }
        match self.topology.registry.endpoints(resource) {
            Err(CoreError::UnresolvedDestination(_)) => Ok(Vec::new()),
            other => other,
        }
    }
}

fn path_rule(spec: &PathRuleSpec) -> Result<PathRule> {
    match spec {
        PathRuleSpec::PrefixMatch {
            match_path,
            path_pattern,
        } => PathRule::prefix_match_with_pattern(
            match_path,
            path_pattern.as_deref().unwrap_or(DEFAULT_PATH_PATTERN),
        ),
        PathRuleSpec::StripPrefix {
            prefix,
            strip_prefix,
        } => PathRule::strip_prefix(prefix, *strip_prefix),
    }
}

fn emitter_options(spec: &EmitterSpec) -> EmitterOptions {
    EmitterOptions {
        key_format: KeyFormat {
            section: spec.section.clone(),
            style: match spec.key_style {
                KeyStyleSpec::Environment => KeyStyle::Environment,
                KeyStyleSpec::Dotted => KeyStyle::Dotted,
            },
        },
        destination_naming: match spec.destination_naming {
            DestinationNamingSpec::Resource => DestinationNaming::Resource,
            DestinationNamingSpec::PerEndpoint => DestinationNaming::PerEndpoint,
        },
    }
}
