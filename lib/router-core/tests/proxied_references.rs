use router_core::{
    BindingSelection, ConfigurationSnapshot, Endpoint, InMemoryEndpointRegistry, KeyFormat, KeyStyle,
    PathRule, Resource, Topology, Transform,
};
use std::sync::Arc;

struct Fixture {
    topology: Topology,
    registry: InMemoryEndpointRegistry,
    gateway: Resource,
    api: Resource,
}

fn fixture() -> Fixture {
    let registry = InMemoryEndpointRegistry::new();
    let mut topology = Topology::new(Arc::new(registry.clone()));
    let api = topology.add_resource("apiservice").unwrap().resource().clone();
    let gateway = topology.add_resource("gateway").unwrap().resource().clone();
    Fixture {
        topology,
        registry,
        gateway,
        api,
    }
}

impl Fixture {
    fn proxy(&mut self, rule: PathRule, binding: Option<&str>) {
        let api = self.api.clone();
        self.topology
            .resource(&self.gateway)
            .unwrap()
            .with_proxied_reference(&api, rule, binding)
            .unwrap();
    }

    fn allocate(&self, name: &str, address: &str) {
        self.registry
            .allocate(&self.api, Endpoint::new(name, address))
            .unwrap();
    }

    fn snapshot(&self) -> ConfigurationSnapshot {
        self.topology.snapshot(&self.gateway).unwrap()
    }
}

#[test]
fn test_weather_gateway_scenario() {
    let mut f = fixture();
    f.proxy(PathRule::prefix_match("/weather").unwrap(), None);
    f.allocate("http", "http://10.0.0.5:8080");

    let format = KeyFormat {
        section: None,
        style: KeyStyle::Dotted,
    };
    let entries = f.snapshot().flatten(&format);

    assert_eq!(entries.len(), 4);
    assert_eq!(entries["Routes.apiserviceRoute.ClusterId"], "apiserviceCluster");
    assert_eq!(entries["Routes.apiserviceRoute.Match.Path"], "/weather");
    assert_eq!(entries["Routes.apiserviceRoute.Transforms[0].PathPattern"], "/{remainder}");
    assert_eq!(
        entries["Clusters.apiserviceCluster.Destinations.apiservice.Address"],
        "http://10.0.0.5:8080"
    );
}

#[test]
fn test_weather_gateway_without_endpoints() {
    let mut f = fixture();
    f.proxy(PathRule::prefix_match("/weather").unwrap(), None);

    let snapshot = f.snapshot();
    assert_eq!(snapshot.routes["apiserviceRoute"].cluster_id, "apiserviceCluster");
    assert!(snapshot.clusters["apiserviceCluster"].destinations.is_empty());
}

#[test]
fn test_idempotent_registration() {
    let mut once = fixture();
    once.proxy(PathRule::prefix_match("/weather").unwrap(), Some("http"));
    once.allocate("http", "http://10.0.0.5:8080");

    let mut twice = fixture();
    twice.proxy(PathRule::prefix_match("/weather").unwrap(), Some("http"));
    twice.proxy(PathRule::prefix_match("/weather").unwrap(), Some("http"));
    twice.allocate("http", "http://10.0.0.5:8080");

    assert_eq!(once.snapshot(), twice.snapshot());
    assert_eq!(
        once.topology.materialize_environment(&once.gateway).unwrap(),
        twice.topology.materialize_environment(&twice.gateway).unwrap()
    );
}

#[test]
fn test_selection_widening_never_reverts() {
    let mut f = fixture();
    f.proxy(PathRule::prefix_match("/weather").unwrap(), Some("http"));
    f.proxy(PathRule::prefix_match("/weather").unwrap(), None);
    f.proxy(PathRule::prefix_match("/weather").unwrap(), Some("http"));

    let reference = f.topology.references().get(&f.gateway, &f.api).unwrap();
    assert_eq!(reference.selection, BindingSelection::AllEndpoints);

    f.allocate("grpc", "http://10.0.0.5:9090");
    let snapshot = f.snapshot();
    assert_eq!(
        snapshot.clusters["apiserviceCluster"].destinations["apiservice"].address,
        "http://10.0.0.5:9090"
    );
}

#[test]
fn test_first_rule_wins() {
    let mut f = fixture();
    f.proxy(PathRule::prefix_match("/weather").unwrap(), None);
    f.proxy(PathRule::strip_prefix("forecast", true).unwrap(), None);

    let route = &f.snapshot().routes["apiserviceRoute"];
    assert_eq!(route.r#match.path, "/weather");
    assert_eq!(route.transforms, vec![Transform::PathPattern("/{remainder}".into())]);
}

#[test]
fn test_endpoint_freshness() {
    let mut f = fixture();
    f.proxy(PathRule::prefix_match("/weather").unwrap(), None);

    assert!(f.snapshot().clusters["apiserviceCluster"].destinations.is_empty());

    f.allocate("http", "http://10.0.0.5:8080");
    assert_eq!(
        f.snapshot().clusters["apiserviceCluster"].destinations["apiservice"].address,
        "http://10.0.0.5:8080"
    );
}

#[test]
fn test_allocation_before_reference() {
    let mut f = fixture();
    f.allocate("http", "http://10.0.0.5:8080");
    f.proxy(PathRule::prefix_match("/weather").unwrap(), Some("http"));

    let env = f.topology.materialize_environment(&f.gateway).unwrap();
    assert_eq!(
        env["ReverseProxy__Clusters__apiserviceCluster__Destinations__apiservice__Address"],
        "http://10.0.0.5:8080"
    );
}

#[test]
fn test_strip_prefix_normalization() {
    let mut f = fixture();
    f.proxy(PathRule::strip_prefix("weather", true).unwrap(), None);
    f.allocate("http", "http://10.0.0.5:8080");

    let route = &f.snapshot().routes["apiserviceRoute"];
    assert_eq!(route.r#match.path, "/weather/{**catch-all}");
    assert_eq!(route.transforms, vec![Transform::PathRemovePrefix("/weather".into())]);
}

#[test]
fn test_named_binding_excludes_other_endpoints() {
    let mut f = fixture();
    f.proxy(PathRule::prefix_match("/weather").unwrap(), Some("https"));
    f.allocate("http", "http://10.0.0.5:8080");

    assert!(f.snapshot().clusters["apiserviceCluster"].destinations.is_empty());

    f.allocate("https", "https://10.0.0.5:8443");
    assert_eq!(
        f.snapshot().clusters["apiserviceCluster"].destinations["apiservice"].address,
        "https://10.0.0.5:8443"
    );
}

#[test]
fn test_removed_destination_does_not_affect_others() {
    let mut f = fixture();
    let forecast = f
        .topology
        .add_resource("forecast")
        .unwrap()
        .resource()
        .clone();
    f.registry
        .allocate(&forecast, Endpoint::new("http", "http://10.0.0.9:8080"))
        .unwrap();
    f.allocate("http", "http://10.0.0.5:8080");
    f.proxy(PathRule::prefix_match("/weather").unwrap(), None);
    f.topology
        .resource(&f.gateway)
        .unwrap()
        .with_proxied_reference(&forecast, PathRule::strip_prefix("forecast", true).unwrap(), None)
        .unwrap();

    f.topology.remove_resource(&forecast).unwrap();

    let snapshot = f.snapshot();
    assert_eq!(snapshot.routes.len(), 2);
    assert_eq!(snapshot.routes["forecastRoute"].cluster_id, "forecastCluster");
    assert!(snapshot.clusters["forecastCluster"].destinations.is_empty());
    assert_eq!(
        snapshot.clusters["apiserviceCluster"].destinations["apiservice"].address,
        "http://10.0.0.5:8080"
    );

    let env = f.topology.materialize_environment(&f.gateway).unwrap();
    assert_eq!(
        env["ReverseProxy__Clusters__apiserviceCluster__Destinations__apiservice__Address"],
        "http://10.0.0.5:8080"
    );
    assert_eq!(env["ReverseProxy__Routes__forecastRoute__Match__Path"], "/forecast/{**catch-all}");
    assert!(!env.keys().any(|k| k.starts_with("ReverseProxy__Clusters__forecastCluster")));
}
