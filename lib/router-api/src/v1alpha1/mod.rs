/// API version v1alpha1 of the topology document

pub mod topology;
pub mod proxied_reference;

pub use topology::{
    DestinationNamingSpec, EmitterSpec, EndpointSpec, KeyStyleSpec, ResourceSpec, TopologySpec,
};
pub use proxied_reference::{PathRuleSpec, ProxiedReferenceSpec};

/// API version accepted in topology documents
pub const API_VERSION: &str = "v1alpha1";
