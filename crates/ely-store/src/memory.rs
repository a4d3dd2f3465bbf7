//! In-process resource store.
//!
//! [`MemoryStore`] models the operation semantics of the management tree:
//! resources addressed by path, attribute reads and writes, children
//! enumeration in creation order, reference checks between security
//! resources, and atomic composites. It records every request it receives
//! and can be told to fail selected operations.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ely_model::{attr, op, Address, Operation, ResourceType, Response};
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};
use crate::store::ResourceStore;

/// Attributes holding the name of another security resource.
const REFERENCES: [(&str, ResourceType); 6] = [
    (attr::KEY_STORE, ResourceType::KeyStore),
    (attr::KEY_MANAGER, ResourceType::KeyManager),
    (attr::SSL_CONTEXT, ResourceType::ServerSslContext),
    (attr::SECURITY_DOMAIN, ResourceType::SecurityDomain),
    (attr::HTTP_AUTHENTICATION_FACTORY, ResourceType::HttpAuthenticationFactory),
    (attr::SASL_AUTHENTICATION_FACTORY, ResourceType::SaslAuthenticationFactory),
];

/// An injected failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The request never reaches the store.
    Transport(String),
    /// The store rejects the operation with this description.
    Outcome(String),
}

type FaultRule = Box<dyn Fn(&Operation) -> Option<Fault> + Send + Sync>;

#[derive(Debug, Clone, Default)]
struct Node {
    seq: u64,
    attributes: Map<String, Value>,
    aliases: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct Tree {
    nodes: BTreeMap<Address, Node>,
    next_seq: u64,
}

impl Tree {
    fn insert(&mut self, address: Address, attributes: Map<String, Value>) {
        self.next_seq += 1;
        self.nodes.insert(
            address,
            Node {
                seq: self.next_seq,
                attributes,
                aliases: Vec::new(),
            },
        );
    }

    fn children(&self, parent: &Address, child_type: &str) -> Vec<(&str, &Node)> {
        let mut children: Vec<_> = self
            .nodes
            .iter()
            .filter(|(address, _)| address.parent().as_ref() == Some(parent))
            .filter_map(|(address, node)| match address.last() {
                Some((key, name)) if key == child_type => Some((name, node)),
                _ => None,
            })
            .collect();
        children.sort_by_key(|(_, node)| node.seq);
        children
    }

    fn security_resource_exists(&self, resource_type: ResourceType, name: &str) -> bool {
        self.nodes
            .contains_key(&Address::elytron_resource(resource_type, name))
    }

    fn realm_exists(&self, name: &str) -> bool {
        ResourceType::REALMS
            .into_iter()
            .any(|t| self.security_resource_exists(t, name))
    }
}

/// Reason an operation did not apply.
enum Failure {
    Rejected(String),
    Transport(String),
}

impl From<Fault> for Failure {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Transport(m) => Self::Transport(m),
            Fault::Outcome(m) => Self::Rejected(m),
        }
    }
}

type Applied = Result<Value, Failure>;

fn rejected<T>(message: impl Into<String>) -> Result<T, Failure> {
    Err(Failure::Rejected(message.into()))
}

/// In-memory resource store.
pub struct MemoryStore {
    tree: Mutex<Tree>,
    executed: Mutex<Vec<Operation>>,
    faults: Mutex<Vec<FaultRule>>,
    reloads: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("resources", &self.tree.lock().nodes.len())
            .field("executed", &self.executed.lock().len())
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Creates a store holding the security and web subsystems and the
    /// management core service, all empty.
    #[must_use]
    pub fn new() -> Self {
        let store = Self::empty();
        store.insert(Address::elytron(), Value::Null);
        store.insert(
            Address::subsystem(ely_model::address::UNDERTOW_SUBSYSTEM),
            Value::Null,
        );
        store.insert(Address::root().child("core-service", "management"), Value::Null);
        store
    }

    /// Creates a store holding only the root resource.
    #[must_use]
    pub fn empty() -> Self {
        let mut tree = Tree::default();
        tree.insert(Address::root(), Map::new());
        Self {
            tree: Mutex::new(tree),
            executed: Mutex::new(Vec::new()),
            faults: Mutex::new(Vec::new()),
            reloads: AtomicUsize::new(0),
        }
    }

    /// Creates or replaces a resource, creating missing ancestors.
    ///
    /// `attributes` should be a JSON object; anything else stores no
    /// attributes. No reference checks are made.
    pub fn insert(&self, address: Address, attributes: Value) {
        let attributes = match attributes {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let mut tree = self.tree.lock();
        let mut missing = Vec::new();
        let mut cursor = address.parent();
        while let Some(ancestor) = cursor {
            if tree.nodes.contains_key(&ancestor) {
                break;
            }
            cursor = ancestor.parent();
            missing.push(ancestor);
        }
        for ancestor in missing.into_iter().rev() {
            tree.insert(ancestor, Map::new());
        }
        tree.insert(address, attributes);
    }

    /// Whether a resource exists.
    #[must_use]
    pub fn contains(&self, address: &Address) -> bool {
        self.tree.lock().nodes.contains_key(address)
    }

    /// Attributes of a resource.
    #[must_use]
    pub fn attributes(&self, address: &Address) -> Option<Map<String, Value>> {
        self.tree
            .lock()
            .nodes
            .get(address)
            .map(|n| n.attributes.clone())
    }

    /// One attribute of a resource; `name` may be a dotted path.
    #[must_use]
    pub fn attribute(&self, address: &Address, name: &str) -> Option<Value> {
        let tree = self.tree.lock();
        let node = tree.nodes.get(address)?;
        get_path(&node.attributes, name).cloned()
    }

    /// Names of children of `child_type` under `parent`, in creation order.
    #[must_use]
    pub fn children(&self, parent: &Address, child_type: &str) -> Vec<String> {
        self.tree
            .lock()
            .children(parent, child_type)
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Names of security resources of a type, in creation order.
    #[must_use]
    pub fn security_resources(&self, resource_type: ResourceType) -> Vec<String> {
        self.children(&Address::elytron(), resource_type.as_str())
    }

    /// Aliases generated in a key store.
    #[must_use]
    pub fn key_aliases(&self, key_store: &str) -> Vec<String> {
        self.tree
            .lock()
            .nodes
            .get(&Address::elytron_resource(ResourceType::KeyStore, key_store))
            .map(|n| n.aliases.clone())
            .unwrap_or_default()
    }

    /// Every request received, in order. A composite counts as one request.
    #[must_use]
    pub fn executed(&self) -> Vec<Operation> {
        self.executed.lock().clone()
    }

    /// Requests received that would change the tree.
    #[must_use]
    pub fn executed_writes(&self) -> Vec<Operation> {
        self.executed
            .lock()
            .iter()
            .filter(|o| !is_read(&o.name))
            .cloned()
            .collect()
    }

    /// Forgets the recorded requests.
    pub fn clear_executed(&self) {
        self.executed.lock().clear();
    }

    /// Number of `reload` operations applied.
    #[must_use]
    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    /// Registers a fault rule, consulted for every operation including
    /// composite steps.
    pub fn fail_on<F>(&self, rule: F)
    where
        F: Fn(&Operation) -> Option<Fault> + Send + Sync + 'static,
    {
        self.faults.lock().push(Box::new(rule));
    }

    /// Makes every enumeration of `resource_type` fail in transport.
    pub fn fail_reads_of(&self, resource_type: ResourceType) {
        self.fail_on(move |o| {
            let enumerates = o.name == op::READ_CHILDREN_RESOURCES
                || o.name == op::READ_CHILDREN_NAMES;
            (enumerates && o.param_str(attr::CHILD_TYPE) == Some(resource_type.as_str()))
                .then(|| Fault::Transport(format!("connection reset reading {resource_type}")))
        });
    }

    /// Makes `operation` on `address` fail with `message`.
    pub fn fail_operation(&self, operation: &str, address: Address, message: impl Into<String>) {
        let operation = operation.to_string();
        let message = message.into();
        self.fail_on(move |o| {
            (o.name == operation && o.address == address).then(|| Fault::Outcome(message.clone()))
        });
    }

    /// Removes every fault rule.
    pub fn clear_faults(&self) {
        self.faults.lock().clear();
    }

    fn fault_for(&self, operation: &Operation) -> Option<Fault> {
        self.faults.lock().iter().find_map(|rule| rule(operation))
    }

    fn run(&self, operation: &Operation) -> StoreResult<Response> {
        self.executed.lock().push(operation.clone());

        let mut tree = self.tree.lock();
        let mut scratch = tree.clone();
        let mut reloads = 0;
        match self.apply(&mut scratch, operation, &mut reloads) {
            Ok(result) => {
                *tree = scratch;
                self.reloads.fetch_add(reloads, Ordering::SeqCst);
                Ok(Response::success(result))
            }
            Err(Failure::Rejected(message)) => {
                tracing::debug!(operation = %operation.name, address = %operation.address, %message, "operation rejected");
                Ok(Response::failed(message))
            }
            Err(Failure::Transport(message)) => Err(StoreError::Connection(message)),
        }
    }

    fn apply(&self, tree: &mut Tree, operation: &Operation, reloads: &mut usize) -> Applied {
        if let Some(fault) = self.fault_for(operation) {
            return Err(fault.into());
        }

        let address = &operation.address;
        match operation.name.as_str() {
            op::COMPOSITE => self.apply_composite(tree, operation, reloads),
            op::ADD => add(tree, operation),
            op::REMOVE => remove(tree, address),
            op::READ_RESOURCE => Ok(Value::Object(node(tree, address)?.attributes.clone())),
            op::READ_ATTRIBUTE => {
                let name = required_param(operation, attr::NAME)?;
                let node = node(tree, address)?;
                Ok(get_path(&node.attributes, name).cloned().unwrap_or(Value::Null))
            }
            op::READ_CHILDREN_NAMES => {
                let child_type = required_param(operation, attr::CHILD_TYPE)?;
                node(tree, address)?;
                let names = tree
                    .children(address, child_type)
                    .into_iter()
                    .map(|(name, _)| Value::String(name.to_string()))
                    .collect();
                Ok(Value::Array(names))
            }
            op::READ_CHILDREN_RESOURCES => {
                let child_type = required_param(operation, attr::CHILD_TYPE)?;
                node(tree, address)?;
                let resources = tree
                    .children(address, child_type)
                    .into_iter()
                    .map(|(name, node)| (name.to_string(), Value::Object(node.attributes.clone())))
                    .collect();
                Ok(Value::Object(resources))
            }
            op::WRITE_ATTRIBUTE => write_attribute(tree, operation),
            op::UNDEFINE_ATTRIBUTE => {
                let name = required_param(operation, attr::NAME)?;
                remove_path(&mut node_mut(tree, address)?.attributes, name);
                Ok(Value::Null)
            }
            op::GENERATE_KEY_PAIR => {
                let alias = required_param(operation, attr::ALIAS)?.to_string();
                required_param(operation, attr::DISTINGUISHED_NAME)?;
                let node = key_store_mut(tree, address)?;
                if node.aliases.contains(&alias) {
                    return rejected(format!("Alias '{alias}' already exists in {address}"));
                }
                node.aliases.push(alias);
                Ok(Value::Null)
            }
            op::STORE => {
                key_store_mut(tree, address)?;
                Ok(Value::Null)
            }
            op::EXPORT_CERTIFICATE => {
                let alias = required_param(operation, attr::ALIAS)?;
                required_param(operation, attr::PATH)?;
                let node = key_store_mut(tree, address)?;
                if !node.aliases.iter().any(|a| a == alias) {
                    return rejected(format!("Alias '{alias}' does not exist in {address}"));
                }
                Ok(Value::Null)
            }
            op::RELOAD => {
                *reloads += 1;
                Ok(Value::Null)
            }
            other => rejected(format!("Operation '{other}' is not supported by {address}")),
        }
    }

    fn apply_composite(&self, tree: &mut Tree, operation: &Operation, reloads: &mut usize) -> Applied {
        let steps = operation
            .steps()
            .map_err(|e| Failure::Rejected(e.to_string()))?;

        let mut results = Map::new();
        for (index, step) in steps.iter().enumerate() {
            let step_id = format!("step-{}", index + 1);
            match self.apply(tree, step, reloads) {
                Ok(result) => {
                    let mut outcome = Map::new();
                    outcome.insert("outcome".into(), Value::String("success".into()));
                    if !result.is_null() {
                        outcome.insert("result".into(), result);
                    }
                    results.insert(step_id, Value::Object(outcome));
                }
                Err(Failure::Rejected(message)) => {
                    return rejected(format!(
                        "Composite operation failed and was rolled back. Step {} failed: {message}",
                        index + 1
                    ));
                }
                Err(transport) => return Err(transport),
            }
        }
        Ok(Value::Object(results))
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn execute(&self, operation: &Operation) -> StoreResult<Response> {
        self.run(operation)
    }
}

fn is_read(name: &str) -> bool {
    matches!(
        name,
        op::READ_RESOURCE | op::READ_ATTRIBUTE | op::READ_CHILDREN_NAMES | op::READ_CHILDREN_RESOURCES
    )
}

fn not_found(address: &Address) -> Failure {
    Failure::Rejected(format!("Management resource '{address}' not found"))
}

fn node<'a>(tree: &'a Tree, address: &Address) -> Result<&'a Node, Failure> {
    tree.nodes.get(address).ok_or_else(|| not_found(address))
}

fn node_mut<'a>(tree: &'a mut Tree, address: &Address) -> Result<&'a mut Node, Failure> {
    tree.nodes.get_mut(address).ok_or_else(|| not_found(address))
}

fn key_store_mut<'a>(tree: &'a mut Tree, address: &Address) -> Result<&'a mut Node, Failure> {
    match address.last() {
        Some((key, _)) if key == ResourceType::KeyStore.as_str() => node_mut(tree, address),
        _ => rejected(format!("{address} is not a key store")),
    }
}

fn required_param<'a>(operation: &'a Operation, name: &str) -> Result<&'a str, Failure> {
    operation.param_str(name).ok_or_else(|| {
        Failure::Rejected(format!(
            "Parameter '{name}' is required by operation '{}'",
            operation.name
        ))
    })
}

fn add(tree: &mut Tree, operation: &Operation) -> Applied {
    let address = &operation.address;
    if tree.nodes.contains_key(address) {
        return rejected(format!("Duplicate resource {address}"));
    }
    let Some(parent) = address.parent() else {
        return rejected("The root resource cannot be added");
    };
    if !tree.nodes.contains_key(&parent) {
        return rejected(format!("Parent resource {parent} of {address} not found"));
    }

    let attributes: Map<String, Value> = operation
        .params
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    check_references(tree, address, &attributes)?;

    tree.insert(address.clone(), attributes);
    Ok(Value::Null)
}

fn remove(tree: &mut Tree, address: &Address) -> Applied {
    node(tree, address)?;
    if let Some((key, name)) = address.last() {
        if let Ok(removed_type) = key.parse::<ResourceType>() {
            for (other, node) in &tree.nodes {
                if other == address {
                    continue;
                }
                let referenced = references(&node.attributes).into_iter().any(|r| match r {
                    Reference::Resource(t, n) => t == removed_type && n == name,
                    Reference::Realm(n) => ResourceType::REALMS.contains(&removed_type) && n == name,
                });
                if referenced {
                    return rejected(format!(
                        "Cannot remove {address}: it is referenced by {other}"
                    ));
                }
            }
        }
    }

    let prefix = address.elements();
    tree.nodes
        .retain(|candidate, _| !candidate.elements().starts_with(prefix));
    Ok(Value::Null)
}

fn write_attribute(tree: &mut Tree, operation: &Operation) -> Applied {
    let address = &operation.address;
    let name = required_param(operation, attr::NAME)?.to_string();
    let value = operation.params.get(attr::VALUE).cloned().unwrap_or(Value::Null);
    node(tree, address)?;

    let leaf = name.rsplit('.').next().unwrap_or(&name).to_string();
    let mut written = Map::new();
    written.insert(leaf, value.clone());
    check_references(tree, address, &written)?;

    let node = node_mut(tree, address)?;
    if value.is_null() {
        remove_path(&mut node.attributes, &name);
    } else {
        set_path(&mut node.attributes, &name, value);
    }
    Ok(Value::Null)
}

enum Reference<'a> {
    Resource(ResourceType, &'a str),
    Realm(&'a str),
}

/// Collects the security resources named by `attributes`, looking into
/// nested objects and security domain realm lists.
fn references(attributes: &Map<String, Value>) -> Vec<Reference<'_>> {
    let mut found = Vec::new();
    for (key, value) in attributes {
        if let Some((_, resource_type)) = REFERENCES.iter().find(|(k, _)| k == key) {
            if let Some(name) = value.as_str() {
                found.push(Reference::Resource(*resource_type, name));
            }
        } else if key == attr::REALMS {
            let entries = value.as_array().map(Vec::as_slice).unwrap_or_default();
            found.extend(
                entries
                    .iter()
                    .filter_map(|r| r.get(attr::REALM).and_then(Value::as_str))
                    .map(Reference::Realm),
            );
        } else if let Value::Object(nested) = value {
            found.extend(references(nested));
        }
    }
    found
}

fn check_references(tree: &Tree, address: &Address, attributes: &Map<String, Value>) -> Result<(), Failure> {
    for reference in references(attributes) {
        match reference {
            Reference::Resource(resource_type, name) => {
                if !tree.security_resource_exists(resource_type, name) {
                    return rejected(format!(
                        "{address} references {resource_type} '{name}' which does not exist"
                    ));
                }
            }
            Reference::Realm(name) => {
                if !tree.realm_exists(name) {
                    return rejected(format!(
                        "{address} references realm '{name}' which does not exist"
                    ));
                }
            }
        }
    }
    Ok(())
}

fn get_path<'a>(attributes: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = attributes.get(first)?;
    for segment in segments {
        current = current.get(segment)?;
    }
    Some(current)
}

fn set_path(attributes: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            attributes.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = attributes
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(nested) = entry {
                set_path(nested, rest, value);
            }
        }
    }
}

fn remove_path(attributes: &mut Map<String, Value>, path: &str) {
    match path.split_once('.') {
        None => {
            attributes.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Value::Object(nested)) = attributes.get_mut(head) {
                remove_path(nested, rest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ks(name: &str) -> Address {
        Address::elytron_resource(ResourceType::KeyStore, name)
    }

    fn km(name: &str) -> Address {
        Address::elytron_resource(ResourceType::KeyManager, name)
    }

    fn attrs(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[tokio::test]
    async fn add_then_read_children_in_creation_order() {
        let store = MemoryStore::new();
        for name in ["zeta", "alpha", "mid"] {
            let response = store
                .execute(&Operation::add(ks(name), &attrs(json!({"path": name}))))
                .await
                .unwrap();
            assert!(response.is_success());
        }

        let response = store
            .execute(&Operation::read_elytron_children(ResourceType::KeyStore))
            .await
            .unwrap();
        let names: Vec<_> = response.result.unwrap().as_object().unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected() {
        let store = MemoryStore::new();
        store.insert(ks("a"), json!({"path": "a"}));
        let response = store
            .execute(&Operation::add(ks("a"), &attrs(json!({"path": "b"}))))
            .await
            .unwrap();
        assert!(!response.is_success());
        assert!(response.failure_message().contains("Duplicate resource"));
    }

    #[tokio::test]
    async fn dangling_reference_is_rejected() {
        let store = MemoryStore::new();
        let response = store
            .execute(&Operation::add(km("km"), &attrs(json!({"key-store": "missing"}))))
            .await
            .unwrap();
        assert!(!response.is_success());
        assert!(response.failure_message().contains("missing"));
    }

    #[tokio::test]
    async fn composite_is_atomic() {
        let store = MemoryStore::new();
        let steps = vec![
            Operation::add(ks("a"), &attrs(json!({"path": "a"}))),
            Operation::add(km("km"), &attrs(json!({"key-store": "nope"}))),
        ];
        let response = store.execute_composite(steps).await.unwrap();

        assert!(!response.is_success());
        assert!(response.failure_message().contains("Step 2 failed"));
        assert!(!store.contains(&ks("a")));
        assert_eq!(store.executed().len(), 1);
    }

    #[tokio::test]
    async fn composite_steps_see_earlier_steps() {
        let store = MemoryStore::new();
        let steps = vec![
            Operation::add(ks("a"), &attrs(json!({"path": "a"}))),
            Operation::add(km("km"), &attrs(json!({"key-store": "a"}))),
        ];
        let response = store.execute_composite(steps).await.unwrap();
        assert!(response.is_success());
        assert!(store.contains(&km("km")));
    }

    #[tokio::test]
    async fn dotted_attribute_paths() {
        let store = MemoryStore::new();
        let itf = Address::root()
            .child("core-service", "management")
            .child("management-interface", "http-interface");
        store.insert(itf.clone(), json!({"http-upgrade": {"enabled": true}}));
        store.insert(
            Address::elytron_resource(ResourceType::SaslAuthenticationFactory, "f"),
            json!({}),
        );

        let write = Operation::write_attribute(itf.clone(), "http-upgrade.sasl-authentication-factory", "f");
        assert!(store.execute(&write).await.unwrap().is_success());
        assert_eq!(
            store.attribute(&itf, "http-upgrade"),
            Some(json!({"enabled": true, "sasl-authentication-factory": "f"}))
        );

        let undefine = Operation::undefine_attribute(itf.clone(), "http-upgrade.sasl-authentication-factory");
        assert!(store.execute(&undefine).await.unwrap().is_success());
        assert_eq!(store.attribute(&itf, "http-upgrade"), Some(json!({"enabled": true})));
    }

    #[tokio::test]
    async fn referenced_resource_cannot_be_removed() {
        let store = MemoryStore::new();
        store.insert(ks("a"), json!({"path": "a"}));
        store.insert(km("km"), json!({"key-store": "a"}));

        let response = store.execute(&Operation::remove(ks("a"))).await.unwrap();
        assert!(!response.is_success());
        assert!(store.contains(&ks("a")));
    }

    #[tokio::test]
    async fn transport_fault_is_an_error() {
        let store = MemoryStore::new();
        store.fail_reads_of(ResourceType::KeyStore);
        let result = store
            .execute(&Operation::read_elytron_children(ResourceType::KeyStore))
            .await;
        assert!(matches!(result, Err(StoreError::Connection(_))));

        store.clear_faults();
        let result = store
            .execute(&Operation::read_elytron_children(ResourceType::KeyStore))
            .await;
        assert!(result.unwrap().is_success());
    }

    #[tokio::test]
    async fn key_pair_operations() {
        let store = MemoryStore::new();
        store.insert(ks("gen"), json!({"path": "gen.keystore"}));
        let export = Operation::new(op::EXPORT_CERTIFICATE, ks("gen"))
            .param("alias", "server")
            .param("path", "gen.keystore.pem");
        assert!(!store.execute(&export).await.unwrap().is_success());

        let generate = Operation::new(op::GENERATE_KEY_PAIR, ks("gen"))
            .param("alias", "server")
            .param("distinguished-name", "CN=localhost");
        assert!(store.execute(&generate).await.unwrap().is_success());
        assert!(store.execute(&export).await.unwrap().is_success());
        assert_eq!(store.key_aliases("gen"), vec!["server"]);
    }

    #[tokio::test]
    async fn reload_is_counted_only_when_applied() {
        let store = MemoryStore::new();
        store.execute(&Operation::reload()).await.unwrap();
        assert_eq!(store.reload_count(), 1);

        let steps = vec![Operation::reload(), Operation::remove(ks("missing"))];
        store.execute_composite(steps).await.unwrap();
        assert_eq!(store.reload_count(), 1);
    }
}
