//! Endpoint discovery from Kubernetes `Endpoints` objects

use futures::StreamExt;
use k8s_openapi::api::core::v1::Endpoints;
use kube::{Api, Client};
use kube_runtime::reflector::{self, ObjectRef, Store};
use kube_runtime::{watcher, WatchStreamExt};
use router_core::{CoreError, Endpoint, EndpointRegistry, Resource};
use tracing::{debug, info, warn};

/// KubeEndpointRegistry resolves resources to the `Endpoints` object of the
/// same name in one namespace.
///
/// A reflector keeps an in-memory copy of every `Endpoints` object, so lookups
/// never touch the API server.
#[derive(Clone)]
pub struct KubeEndpointRegistry {
    store: Store<Endpoints>,
    namespace: String,
}

impl KubeEndpointRegistry {
    /// Start watching `Endpoints` in `namespace` and wait for the initial list
    pub async fn start(client: Client, namespace: &str) -> anyhow::Result<Self> {
        let api: Api<Endpoints> = Api::namespaced(client, namespace);
        let (store, writer) = reflector::store();

        let stream = reflector::reflector(writer, watcher(api, watcher::Config::default()))
            .default_backoff();
        let ns = namespace.to_string();
        tokio::spawn(async move {
            stream
                .for_each(|event| {
                    if let Err(e) = event {
                        warn!("Endpoints watch error in {}: {}", ns, e);
                    }
                    futures::future::ready(())
                })
                .await;
        });

        store
            .wait_until_ready()
            .await
            .map_err(|e| anyhow::anyhow!("Endpoints store for {} never became ready: {}", namespace, e))?;
        info!(
            "Watching {} Endpoints objects in namespace {}",
            store.state().len(),
            namespace
        );

        Ok(Self {
            store,
            namespace: namespace.to_string(),
        })
    }
}

impl EndpointRegistry for KubeEndpointRegistry {
    fn endpoints(&self, resource: &Resource) -> router_core::Result<Vec<Endpoint>> {
        let key = ObjectRef::new(resource.name()).within(&self.namespace);
        let object = self
            .store
            .get(&key)
            .ok_or_else(|| CoreError::UnresolvedDestination(resource.to_string()))?;

        let endpoints = endpoints_from_object(&object);
        debug!("Resolved {} endpoints for {}", endpoints.len(), resource);
        Ok(endpoints)
    }
}

/// Flatten an `Endpoints` object into named endpoints, one per ready address
/// and port. Endpoints are named after their port (`default` when unnamed), so
/// replicas share a name.
pub fn endpoints_from_object(object: &Endpoints) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();

    for subset in object.subsets.iter().flatten() {
        let addresses = subset.addresses.iter().flatten();
        let ports: Vec<_> = subset.ports.iter().flatten().collect();

        for address in addresses {
            for port in &ports {
                let name = port.name.clone().unwrap_or_else(|| "default".to_string());
                let port_number = match u16::try_from(port.port) {
                    Ok(p) => p,
                    Err(_) => {
                        warn!("Skipping invalid port {} for {}", port.port, address.ip);
                        continue;
                    }
                };
                let scheme = scheme_for(port.app_protocol.as_deref(), &name);
                endpoints.push(Endpoint::allocated(name, scheme, &address.ip, port_number));
            }
        }
    }

    endpoints
}

fn scheme_for(app_protocol: Option<&str>, port_name: &str) -> &'static str {
    let hint = app_protocol.unwrap_or(port_name);
    if hint.eq_ignore_ascii_case("https") || hint.ends_with("/https") {
        "https"
    } else {
        "http"
    }
}
