//! Resource addresses.
//!
//! An address is the ordered list of `key=value` path elements that locates a
//! resource in the management tree, for example
//! `/subsystem=elytron/key-store=server-ks`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::resource::ResourceType;

/// Name of the subsystem that owns every security resource.
pub const ELYTRON_SUBSYSTEM: &str = "elytron";

/// Name of the web subsystem that owns HTTP servers and listeners.
pub const UNDERTOW_SUBSYSTEM: &str = "undertow";

/// Address of a resource in the management tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<BTreeMap<String, String>>",
    into = "Vec<BTreeMap<String, String>>"
)]
pub struct Address(Vec<(String, String)>);

impl Address {
    /// The root of the management tree.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// `/subsystem=<name>`.
    #[must_use]
    pub fn subsystem(name: &str) -> Self {
        Self::root().child("subsystem", name)
    }

    /// `/subsystem=elytron`, the parent of every security resource.
    #[must_use]
    pub fn elytron() -> Self {
        Self::subsystem(ELYTRON_SUBSYSTEM)
    }

    /// `/subsystem=elytron/<type>=<name>`.
    #[must_use]
    pub fn elytron_resource(resource_type: ResourceType, name: &str) -> Self {
        Self::elytron().child(resource_type.as_str(), name)
    }

    /// Returns a new address with one more path element.
    #[must_use]
    pub fn child(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// Path elements, outermost first.
    #[must_use]
    pub fn elements(&self) -> &[(String, String)] {
        &self.0
    }

    /// Whether this is the root address.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The parent address, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// The last path element as `(type, name)`.
    #[must_use]
    pub fn last(&self) -> Option<(&str, &str)> {
        self.0.last().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Name of the addressed resource (value of the last element).
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.last().map(|(_, v)| v)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for (key, value) in &self.0 {
            write!(f, "/{key}={value}")?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<BTreeMap<String, String>>> for Address {
    type Error = ModelError;

    fn try_from(value: Vec<BTreeMap<String, String>>) -> Result<Self, Self::Error> {
        let mut elements = Vec::with_capacity(value.len());
        for element in value {
            if element.len() != 1 {
                return Err(ModelError::InvalidAddress(format!(
                    "each address element must hold exactly one key, got {}",
                    element.len()
                )));
            }
            elements.extend(element);
        }
        Ok(Self(elements))
    }
}

impl From<Address> for Vec<BTreeMap<String, String>> {
    fn from(address: Address) -> Self {
        address
            .0
            .into_iter()
            .map(|(k, v)| BTreeMap::from([(k, v)]))
            .collect()
    }
}
