//! Which endpoints of a destination are exposed to a route

use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingSelection {
    AllEndpoints,
    NamedEndpoints(BTreeSet<String>),
}

impl BindingSelection {
    /// Selection for an optional binding name; `None` selects every endpoint
    pub fn from_binding(binding: Option<&str>) -> Self {
        match binding {
            Some(name) => BindingSelection::NamedEndpoints(BTreeSet::from([name.to_string()])),
            None => BindingSelection::AllEndpoints,
        }
    }

    /// Widen this selection with `other`. `AllEndpoints` is absorbing.
    pub fn merge(&mut self, other: &BindingSelection) {
        match other {
            BindingSelection::AllEndpoints => *self = BindingSelection::AllEndpoints,
            BindingSelection::NamedEndpoints(more) => {
                if let BindingSelection::NamedEndpoints(names) = self {
                    names.extend(more.iter().cloned());
                }
            }
        }
    }

    pub fn includes(&self, endpoint_name: &str) -> bool {
        match self {
            BindingSelection::AllEndpoints => true,
            BindingSelection::NamedEndpoints(names) => names.contains(endpoint_name),
        }
    }
}
