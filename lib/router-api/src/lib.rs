//! Declarative topology documents for proxied service references
//!
//! This library defines the document format read by the router tooling:
//! - TopologySpec: resources, their endpoints and environment
//! - ProxiedReferenceSpec: a route from a source resource to a destination
//! - EmitterSpec: layout of the generated reverse proxy configuration

pub mod v1alpha1;

pub use v1alpha1::{PathRuleSpec, ProxiedReferenceSpec, ResourceSpec, TopologySpec};
