//! Endpoint registry: the network endpoints allocated to each resource

use crate::{CoreError, Endpoint, Resource, Result};
use parking_lot::RwLock;
use router_api::v1alpha1::TopologySpec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Source of the endpoints currently allocated to a resource.
///
/// Lookups are synchronous reads of already-allocated state and must reflect
/// the latest allocation every time they are called. Registries exposing
/// replicas may return several endpoints with the same name, one per address.
pub trait EndpointRegistry: Send + Sync {
    /// Endpoints of `resource` in allocation order, possibly empty.
    /// Fails with [`CoreError::UnresolvedDestination`] for unknown resources.
    fn endpoints(&self, resource: &Resource) -> Result<Vec<Endpoint>>;
}

impl<R: EndpointRegistry + ?Sized> EndpointRegistry for Arc<R> {
    fn endpoints(&self, resource: &Resource) -> Result<Vec<Endpoint>> {
        (**self).endpoints(resource)
    }
}

/// InMemoryEndpointRegistry records endpoints as the host allocates them
#[derive(Clone, Default)]
pub struct InMemoryEndpointRegistry {
    // Map of resource to its endpoints, append-only per resource
    resources: Arc<RwLock<HashMap<Resource, Vec<Endpoint>>>>,
}

impl InMemoryEndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource with no endpoints yet. Keeps existing endpoints.
    pub fn register_resource(&self, resource: &Resource) {
        let mut resources = self.resources.write();
        resources.entry(resource.clone()).or_default();
        debug!("Registered resource: {}", resource);
    }

    /// Record an endpoint allocated to `resource`, registering the resource if
    /// needed. Allocating an identical endpoint twice is a no-op.
    pub fn allocate(&self, resource: &Resource, endpoint: Endpoint) -> Result<()> {
        let mut resources = self.resources.write();
        let endpoints = resources.entry(resource.clone()).or_default();

        match endpoints.iter().find(|e| e.name == endpoint.name) {
            Some(existing) if existing.address == endpoint.address => Ok(()),
            Some(_) => Err(CoreError::EndpointConflict {
                resource: resource.to_string(),
                endpoint: endpoint.name,
            }),
            None => {
                debug!("Allocated endpoint {} for {}: {}", endpoint.name, resource, endpoint.address);
                endpoints.push(endpoint);
                Ok(())
            }
        }
    }

    /// Deregister a resource and drop its endpoints
    pub fn deregister_resource(&self, resource: &Resource) {
        let mut resources = self.resources.write();
        if resources.remove(resource).is_some() {
            debug!("Deregistered resource: {}", resource);
        }
    }

    /// Registry holding the endpoints listed in a topology document
    pub fn from_spec(spec: &TopologySpec) -> Result<Self> {
        let registry = InMemoryEndpointRegistry::new();
        for resource_spec in &spec.resources {
            let resource = Resource::new(resource_spec.name.as_str())?;
            registry.register_resource(&resource);
            for endpoint in &resource_spec.endpoints {
                registry.allocate(
                    &resource,
                    Endpoint::new(endpoint.name.as_str(), endpoint.address.as_str()),
                )?;
            }
        }
        Ok(registry)
    }

    /// Get count of registered resources
    pub fn resource_count(&self) -> usize {
        self.resources.read().len()
    }
}

impl EndpointRegistry for InMemoryEndpointRegistry {
    fn endpoints(&self, resource: &Resource) -> Result<Vec<Endpoint>> {
        let resources = self.resources.read();
        resources
            .get(resource)
            .cloned()
            .ok_or_else(|| CoreError::UnresolvedDestination(resource.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> Resource {
        Resource::new("apiservice").unwrap()
    }

    #[test]
    fn test_unknown_resource_is_unresolved() {
        let registry = InMemoryEndpointRegistry::new();
        assert!(matches!(
            registry.endpoints(&api()),
            Err(CoreError::UnresolvedDestination(name)) if name == "apiservice"
        ));
    }

    #[test]
    fn test_registered_resource_starts_empty() {
        let registry = InMemoryEndpointRegistry::new();
        registry.register_resource(&api());
        assert!(registry.endpoints(&api()).unwrap().is_empty());
        assert_eq!(registry.resource_count(), 1);
    }

    #[test]
    fn test_allocate_is_append_only() {
        let registry = InMemoryEndpointRegistry::new();
        registry.allocate(&api(), Endpoint::new("http", "http://10.0.0.5:8080")).unwrap();
        registry.allocate(&api(), Endpoint::new("https", "https://10.0.0.5:8443")).unwrap();
        registry.allocate(&api(), Endpoint::new("http", "http://10.0.0.5:8080")).unwrap();

        let endpoints = registry.endpoints(&api()).unwrap();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].name, "http");
        assert_eq!(endpoints[1].name, "https");

        // registering again keeps allocations
        registry.register_resource(&api());
        assert_eq!(registry.endpoints(&api()).unwrap().len(), 2);
    }

    #[test]
    fn test_allocate_conflict() {
        let registry = InMemoryEndpointRegistry::new();
        registry.allocate(&api(), Endpoint::new("http", "http://10.0.0.5:8080")).unwrap();
        let err = registry
            .allocate(&api(), Endpoint::new("http", "http://10.0.0.6:8080"))
            .unwrap_err();
        assert!(matches!(err, CoreError::EndpointConflict { .. }));
    }

    #[test]
    fn test_from_spec() {
        use router_api::v1alpha1::{EndpointSpec, ResourceSpec, API_VERSION};

        let endpoint = |name: &str, address: &str| EndpointSpec {
            name: name.into(),
            address: address.into(),
        };
        let mut spec = TopologySpec {
            api_version: API_VERSION.into(),
            resources: vec![
                ResourceSpec {
                    name: "apiservice".into(),
                    endpoints: vec![endpoint("http", "http://10.0.0.5:8080")],
                    ..Default::default()
                },
                ResourceSpec {
                    name: "gateway".into(),
                    ..Default::default()
                },
            ],
            emitter: Default::default(),
        };

        let registry = InMemoryEndpointRegistry::from_spec(&spec).unwrap();
        assert_eq!(registry.resource_count(), 2);
        assert_eq!(registry.endpoints(&api()).unwrap()[0].address, "http://10.0.0.5:8080");
        assert!(registry.endpoints(&Resource::new("gateway").unwrap()).unwrap().is_empty());

        spec.resources[0].endpoints.push(endpoint("http", "http://10.0.0.6:8080"));
        assert!(matches!(
            InMemoryEndpointRegistry::from_spec(&spec),
            Err(CoreError::EndpointConflict { .. })
        ));
    }

    #[test]
    fn test_clones_share_state() {
        let registry = InMemoryEndpointRegistry::new();
        let shared: Arc<dyn EndpointRegistry> = Arc::new(registry.clone());
        registry.allocate(&api(), Endpoint::new("http", "http://10.0.0.5:8080")).unwrap();
        assert_eq!(shared.endpoints(&api()).unwrap().len(), 1);

        registry.deregister_resource(&api());
        assert!(shared.endpoints(&api()).is_err());
    }
}
