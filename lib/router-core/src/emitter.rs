//! Derives reverse proxy configuration from the reference table and the
//! current endpoint state

use crate::snapshot::{ClusterConfig, ConfigurationSnapshot, DestinationConfig, KeyFormat, RouteConfig, RouteMatch};
use crate::{CoreError, EndpointRegistry, Reference, ReferenceTable, Resource};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// How destinations inside a cluster are named
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DestinationNaming {
    /// Keyed by destination resource name; with several endpoints the last
    /// one in allocation order wins
    #[default]
    Resource,
    /// Keyed by `<resource>-<endpoint>`; repeated endpoint names get
    /// `-1`, `-2`, ... in allocation order
    PerEndpoint,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmitterOptions {
    pub key_format: KeyFormat,
    pub destination_naming: DestinationNaming,
}

/// Read-only view over references and endpoints producing snapshots.
///
/// Emission never mutates the reference table and may be repeated; every call
/// queries the registry again.
pub struct ConfigurationEmitter<'a> {
    references: &'a ReferenceTable,
    registry: &'a dyn EndpointRegistry,
    options: &'a EmitterOptions,
}

impl<'a> ConfigurationEmitter<'a> {
    pub fn new(
        references: &'a ReferenceTable,
        registry: &'a dyn EndpointRegistry,
        options: &'a EmitterOptions,
    ) -> Self {
        Self {
            references,
            registry,
            options,
        }
    }

    /// Snapshot of every reference declared by `source`
    pub fn emit(&self, source: &Resource) -> ConfigurationSnapshot {
        let mut snapshot = ConfigurationSnapshot::default();
        for reference in self.references.for_source(source) {
            self.emit_reference(reference, &mut snapshot);
        }
        debug!(
            "Emitted {} routes and {} clusters for {}",
            snapshot.routes.len(),
            snapshot.clusters.len(),
            source
        );
        snapshot
    }

    /// Flattened environment entries for `source`
    pub fn emit_environment(&self, source: &Resource) -> BTreeMap<String, String> {
        self.emit(source).flatten(&self.options.key_format)
    }

    fn emit_reference(&self, reference: &Reference, snapshot: &mut ConfigurationSnapshot) {
        let destination = &reference.destination;
        let cluster_id = destination.cluster_id();

        snapshot.routes.insert(
            destination.route_name(),
            RouteConfig {
                cluster_id: cluster_id.clone(),
                r#match: RouteMatch {
                    path: reference.rule.match_path(),
                },
                transforms: reference.rule.transforms(),
            },
        );

        let endpoints = match self.registry.endpoints(destination) {
            Ok(endpoints) => endpoints,
            Err(CoreError::UnresolvedDestination(name)) => {
                warn!(
                    "Destination {} referenced by {} is unresolved, emitting {} without destinations",
                    name, reference.source, cluster_id
                );
                Vec::new()
            }
            Err(e) => {
                warn!(
                    "Failed to look up endpoints of {} for {}: {}",
                    destination, reference.source, e
                );
                Vec::new()
            }
        };

        let mut cluster = ClusterConfig::default();
        // occurrences of each endpoint name, for registries exposing replicas
        let mut seen: BTreeMap<String, usize> = BTreeMap::new();
        for endpoint in endpoints
            .into_iter()
            .filter(|e| reference.selection.includes(&e.name))
        {
            let key = match self.options.destination_naming {
                DestinationNaming::Resource => destination.name().to_string(),
                DestinationNaming::PerEndpoint => {
                    let count = seen.entry(endpoint.name.clone()).or_insert(0);
                    let key = match *count {
                        0 => format!("{}-{}", destination, endpoint.name),
                        n => format!("{}-{}-{}", destination, endpoint.name, n),
                    };
                    *count += 1;
                    key
                }
            };
            if let Some(replaced) = cluster.destinations.insert(
                key,
                DestinationConfig {
                    address: endpoint.address,
                },
            ) {
                debug!(
                    "Endpoint {} of {} replaces destination address {}",
                    endpoint.name, destination, replaced.address
                );
            }
        }

        if cluster.destinations.is_empty() {
            debug!("Cluster {} has no destinations", cluster_id);
        }
        snapshot.clusters.insert(cluster_id, cluster);
    }
}
