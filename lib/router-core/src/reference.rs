//! Reference table: which sources proxy to which destinations, and how

use crate::{BindingSelection, PathRule, Resource};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// A proxied reference from `source` to `destination`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub source: Resource,
    pub destination: Resource,
    /// Rule of the first registration for this pair
    pub rule: PathRule,
    pub selection: BindingSelection,
    /// Every binding name requested for this pair, including those absorbed
    /// by an `AllEndpoints` selection
    pub requested_bindings: BTreeSet<String>,
}

impl Reference {
    fn new(source: Resource, destination: Resource, rule: PathRule, selection: BindingSelection) -> Self {
        let mut reference = Self {
            source,
            destination,
            rule,
            selection: BindingSelection::NamedEndpoints(BTreeSet::new()),
            requested_bindings: BTreeSet::new(),
        };
        reference.merge(&selection);
        reference
    }

    fn merge(&mut self, selection: &BindingSelection) {
        if let BindingSelection::NamedEndpoints(names) = selection {
            self.requested_bindings.extend(names.iter().cloned());
        }
        self.selection.merge(selection);
    }
}

/// Outcome of [`ReferenceTable::record`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recorded {
    /// First reference for this (source, destination) pair
    Created,
    /// Selection merged into an existing reference
    Merged,
}

/// All references declared during this run, keyed by (source, destination)
#[derive(Clone, Debug, Default)]
pub struct ReferenceTable {
    references: BTreeMap<(Resource, Resource), Reference>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference. The first rule recorded for a pair wins; later
    /// calls only widen the selection.
    pub fn record(
        &mut self,
        source: &Resource,
        destination: &Resource,
        rule: PathRule,
        selection: BindingSelection,
    ) -> Recorded {
        let key = (source.clone(), destination.clone());
        match self.references.get_mut(&key) {
            Some(existing) => {
                if existing.rule != rule {
                    debug!(
                        "Keeping first rule {:?} for {} -> {}, ignoring {:?}",
                        existing.rule, source, destination, rule
                    );
                }
                existing.merge(&selection);
                debug!("Merged selection for {} -> {}: {:?}", source, destination, existing.selection);
                Recorded::Merged
            }
            None => {
                debug!("Recorded reference {} -> {} with {:?}", source, destination, rule);
                self.references.insert(
                    key,
                    Reference::new(source.clone(), destination.clone(), rule, selection),
                );
                Recorded::Created
            }
        }
    }

    pub fn get(&self, source: &Resource, destination: &Resource) -> Option<&Reference> {
        self.references.get(&(source.clone(), destination.clone()))
    }

    /// References whose source is `source`, ordered by destination name
    pub fn for_source<'a>(&'a self, source: &'a Resource) -> impl Iterator<Item = &'a Reference> + 'a {
        self.references
            .values()
            .filter(move |reference| &reference.source == source)
    }

    /// Sources that reference `destination`
    pub fn referrers_of<'a>(&'a self, destination: &'a Resource) -> impl Iterator<Item = &'a Resource> + 'a {
        self.references
            .values()
            .filter(move |reference| &reference.destination == destination)
            .map(|reference| &reference.source)
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}
