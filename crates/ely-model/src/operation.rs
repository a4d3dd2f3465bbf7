//! Management operations in their wire form.
//!
//! An operation serialises to `{"operation": <name>, "address": [..], <params>}`.
//! A composite carries its steps in the `steps` parameter and is executed
//! atomically by the store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::address::Address;
use crate::error::ModelError;
use crate::resource::{attr, ResourceType};

/// Operation names.
pub mod op {
    /// `add`
    pub const ADD: &str = "add";
    /// `remove`
    pub const REMOVE: &str = "remove";
    /// `read-resource`
    pub const READ_RESOURCE: &str = "read-resource";
    /// `read-attribute`
    pub const READ_ATTRIBUTE: &str = "read-attribute";
    /// `read-children-names`
    pub const READ_CHILDREN_NAMES: &str = "read-children-names";
    /// `read-children-resources`
    pub const READ_CHILDREN_RESOURCES: &str = "read-children-resources";
    /// `write-attribute`
    pub const WRITE_ATTRIBUTE: &str = "write-attribute";
    /// `undefine-attribute`
    pub const UNDEFINE_ATTRIBUTE: &str = "undefine-attribute";
    /// `composite`
    pub const COMPOSITE: &str = "composite";
    /// `generate-key-pair`
    pub const GENERATE_KEY_PAIR: &str = "generate-key-pair";
    /// `store`
    pub const STORE: &str = "store";
    /// `export-certificate`
    pub const EXPORT_CERTIFICATE: &str = "export-certificate";
    /// `reload`
    pub const RELOAD: &str = "reload";
}

/// A single management operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation name.
    #[serde(rename = "operation")]
    pub name: String,
    /// Target resource.
    #[serde(default)]
    pub address: Address,
    /// Operation parameters, including attribute values for `add`.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl Operation {
    /// Creates an operation without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
            params: Map::new(),
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Adds every defined entry of `attributes` as a parameter.
    ///
    /// Null entries are skipped so that undefined attributes are never sent.
    #[must_use]
    pub fn with_attributes(mut self, attributes: &Map<String, Value>) -> Self {
        for (key, value) in attributes {
            if !value.is_null() {
                self.params.insert(key.clone(), value.clone());
            }
        }
        self
    }

    /// `add` with the given attributes.
    #[must_use]
    pub fn add(address: Address, attributes: &Map<String, Value>) -> Self {
        Self::new(op::ADD, address).with_attributes(attributes)
    }

    /// `remove`.
    #[must_use]
    pub fn remove(address: Address) -> Self {
        Self::new(op::REMOVE, address)
    }

    /// `read-resource`.
    #[must_use]
    pub fn read_resource(address: Address) -> Self {
        Self::new(op::READ_RESOURCE, address)
    }

    /// `read-attribute` of `name`.
    #[must_use]
    pub fn read_attribute(address: Address, name: &str) -> Self {
        Self::new(op::READ_ATTRIBUTE, address).param(attr::NAME, name)
    }

    /// `read-children-names` of `child_type` under `address`.
    #[must_use]
    pub fn read_children_names(address: Address, child_type: &str) -> Self {
        Self::new(op::READ_CHILDREN_NAMES, address).param(attr::CHILD_TYPE, child_type)
    }

    /// `read-children-resources` of `child_type` under `address`.
    #[must_use]
    pub fn read_children_resources(address: Address, child_type: &str) -> Self {
        Self::new(op::READ_CHILDREN_RESOURCES, address).param(attr::CHILD_TYPE, child_type)
    }

    /// `read-children-resources` of a security resource type.
    #[must_use]
    pub fn read_elytron_children(resource_type: ResourceType) -> Self {
        Self::read_children_resources(Address::elytron(), resource_type.as_str())
    }

    /// `write-attribute name=value`.
    #[must_use]
    pub fn write_attribute(address: Address, name: &str, value: impl Into<Value>) -> Self {
        Self::new(op::WRITE_ATTRIBUTE, address)
            .param(attr::NAME, name)
            .param(attr::VALUE, value)
    }

    /// `undefine-attribute name`.
    #[must_use]
    pub fn undefine_attribute(address: Address, name: &str) -> Self {
        Self::new(op::UNDEFINE_ATTRIBUTE, address).param(attr::NAME, name)
    }

    /// `reload` of the whole server.
    #[must_use]
    pub fn reload() -> Self {
        Self::new(op::RELOAD, Address::root())
    }

    /// A composite holding `steps` in order.
    #[must_use]
    pub fn composite(steps: Vec<Self>) -> Self {
        let steps = steps
            .into_iter()
            .map(|s| serde_json::to_value(s).unwrap_or(Value::Null))
            .collect::<Vec<_>>();
        Self::new(op::COMPOSITE, Address::root()).param(attr::STEPS, Value::Array(steps))
    }

    /// Whether this is a composite.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.name == op::COMPOSITE
    }

    /// Decodes the steps of a composite.
    ///
    /// # Errors
    ///
    /// Returns an error if a step does not decode as an operation.
    pub fn steps(&self) -> Result<Vec<Self>, ModelError> {
        let Some(Value::Array(steps)) = self.params.get(attr::STEPS) else {
            return Ok(Vec::new());
        };
        steps
            .iter()
            .map(|s| {
                serde_json::from_value(s.clone())
                    .map_err(|e| ModelError::invalid_value(attr::STEPS, e.to_string()))
            })
            .collect()
    }

    /// A string parameter.
    #[must_use]
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn wire_form_flattens_params() {
        let op = Operation::write_attribute(
            Address::elytron_resource(ResourceType::SecurityDomain, "sd"),
            attr::DEFAULT_REALM,
            "r",
        );
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(
            json,
            json!({
                "operation": "write-attribute",
                "address": [{"subsystem": "elytron"}, {"security-domain": "sd"}],
                "name": "default-realm",
                "value": "r"
            })
        );
    }

    #[test]
    fn add_skips_null_attributes() {
        let mut attrs = Map::new();
        attrs.insert("path".into(), json!("a.keystore"));
        attrs.insert("relative-to".into(), Value::Null);
        let op = Operation::add(Address::elytron_resource(ResourceType::KeyStore, "ks"), &attrs);
        assert_eq!(op.params.len(), 1);
        assert_eq!(op.param_str("path"), Some("a.keystore"));
    }

    #[test]
    fn composite_steps_decode_back() {
        let steps = vec![
            Operation::remove(Address::elytron_resource(ResourceType::KeyStore, "a")),
            Operation::reload(),
        ];
        let composite = Operation::composite(steps.clone());
        assert!(composite.is_composite());
        assert_eq!(composite.address, Address::root());
        assert_eq!(composite.steps().unwrap(), steps);

        let json = serde_json::to_value(&composite).unwrap();
        assert_eq!(json["address"], json!([]));
        assert_eq!(json["steps"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn missing_address_defaults_to_root() {
        let op: Operation = serde_json::from_value(json!({"operation": "reload"})).unwrap();
        assert!(op.address.is_root());
    }
}
