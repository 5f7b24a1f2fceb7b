//! Declaring proxied references from a source resource

use crate::topology::{Populator, Topology};
use crate::{BindingSelection, CoreError, PathRule, Recorded, Resource, Result};
use tracing::debug;

/// Builder for a resource already declared in a [`Topology`]
pub struct ResourceBuilder<'t> {
    topology: &'t mut Topology,
    resource: Resource,
}

impl<'t> ResourceBuilder<'t> {
    pub(crate) fn new(topology: &'t mut Topology, resource: Resource) -> Self {
        Self { topology, resource }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Set a static environment entry on this resource
    pub fn with_environment(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.topology
            .surface_mut(&self.resource)
            .variables
            .insert(key.into(), value.into());
        self
    }

    /// Route requests matching `rule` from this resource to `destination`.
    ///
    /// Without a `binding` every endpoint of the destination is exposed,
    /// otherwise the named endpoint is added to the selection. Repeating a
    /// call is harmless; the first rule declared for a destination is kept.
    pub fn with_proxied_reference(
        &mut self,
        destination: &Resource,
        rule: PathRule,
        binding: Option<&str>,
    ) -> Result<&mut Self> {
        let rule = rule.validated()?;
        if !self.topology.contains(destination) {
            return Err(CoreError::ResourceNotFound(destination.to_string()));
        }

        let selection = BindingSelection::from_binding(binding);
        let recorded = self
            .topology
            .references
            .record(&self.resource, destination, rule, selection);

        if recorded == Recorded::Created {
            self.topology
                .install_populator(&self.resource, Populator::ProxiedReferences);
        }
        debug!(
            "Proxied reference {} -> {} ({:?}, binding {:?})",
            self.resource, destination, recorded, binding
        );
        Ok(self)
    }
}
