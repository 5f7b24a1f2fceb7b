//! Derivation of reverse proxy configuration from proxied service references
//!
//! This library provides:
//! - Reference table recording which sources proxy to which destinations
//! - Binding registrar declaring references on a topology's resources
//! - Configuration emitter combining references with current endpoints
//! - Endpoint registry abstraction with an in-memory implementation

pub mod binding;
pub mod emitter;
pub mod endpoint;
pub mod error;
pub mod reference;
pub mod registry;
pub mod rule;
pub mod selection;
pub mod snapshot;
pub mod topology;

pub use binding::ResourceBuilder;
pub use emitter::{ConfigurationEmitter, DestinationNaming, EmitterOptions};
pub use endpoint::{Endpoint, Resource};
pub use error::{CoreError, Result};
pub use reference::{Recorded, Reference, ReferenceTable};
pub use registry::{EndpointRegistry, InMemoryEndpointRegistry};
pub use rule::{PathRule, Transform};
pub use selection::BindingSelection;
pub use snapshot::{ConfigurationSnapshot, KeyFormat, KeyStyle};
pub use topology::{Populator, Topology};
