//! Kubernetes integration for the router
pub mod discovery;

pub use discovery::KubeEndpointRegistry;
