//! Resource descriptions and operations of the security subsystem.
//!
//! The description builders produce the attribute set a resource is
//! created with. The same set is the canonical description handed to the
//! matcher, so a resource created here is found again on the next run.

use ely_model::{
    attr, op, Address, AuthFactory, AuthFactorySpec, AuthMechanism, GenericRealmConfig, KeyManager,
    MechanismConfig, Operation, PropertiesRealmConfig, Realm, ResourceType, SecurityDomain,
};
use serde_json::{json, Map, Value};

/// Path variable of the server configuration directory.
pub const JBOSS_SERVER_CONFIG_DIR: &str = "jboss.server.config.dir";

/// Algorithm of generated key pairs.
pub const KEY_ALGORITHM: &str = "RSA";

/// Size in bits of generated key pairs.
pub const KEY_SIZE: u32 = 1024;

/// Stands in for values the operator would be asked for.
pub const PLACEHOLDER: &str = "<need user input>";

/// Groups attribute of properties realms.
const GROUPS: &str = "groups";

/// A key store backed by a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyStoreFile {
    /// File path.
    pub path: String,
    /// Path variable the file is relative to.
    pub relative_to: Option<String>,
    /// Clear text password.
    pub password: Option<String>,
    /// Key store type, `JKS` or `PKCS12`.
    pub key_store_type: Option<String>,
    /// Whether the file must exist when the server starts.
    pub required: Option<bool>,
    /// Alias the key store is filtered on.
    pub alias: Option<String>,
}

impl KeyStoreFile {
    /// A key store file at `path`.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Canonical description, also used as the `add` attributes.
    #[must_use]
    pub fn description(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(attr::PATH.into(), json!(self.path));
        map.insert(attr::RELATIVE_TO.into(), json!(self.relative_to));
        if let Some(password) = &self.password {
            map.insert(attr::CREDENTIAL_REFERENCE.into(), credential_reference(password));
        }
        if let Some(key_store_type) = &self.key_store_type {
            map.insert(attr::TYPE.into(), json!(key_store_type));
        }
        if let Some(required) = self.required {
            map.insert(attr::REQUIRED.into(), json!(required));
        }
        map.insert(attr::ALIAS_FILTER.into(), json!(self.alias));
        map
    }
}

/// `{"clear-text": password}`.
#[must_use]
pub fn credential_reference(password: &str) -> Value {
    json!({ attr::CLEAR_TEXT: password })
}

/// Clear text password of a resource's `credential-reference`.
#[must_use]
pub fn credential_password(attributes: &Map<String, Value>) -> Option<String> {
    attributes
        .get(attr::CREDENTIAL_REFERENCE)
        .and_then(|c| c.get(attr::CLEAR_TEXT))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Canonical description of a key manager over `key_manager.key_store`.
#[must_use]
pub fn key_manager_description(key_manager: &KeyManager) -> Map<String, Value> {
    let key_store = &key_manager.key_store;
    let mut map = Map::new();
    map.insert(attr::KEY_STORE.into(), json!(key_store.name));
    map.insert(
        attr::CREDENTIAL_REFERENCE.into(),
        key_store
            .password
            .as_deref()
            .map_or(Value::Null, credential_reference),
    );
    map.insert(attr::ALIAS_FILTER.into(), Value::Null);
    map.insert(attr::ALGORITHM.into(), Value::Null);
    map
}

/// Canonical description of a server SSL context.
#[must_use]
pub fn ssl_context_description(key_manager: &str, protocols: &[String]) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(attr::KEY_MANAGER.into(), json!(key_manager));
    map.insert(attr::WANT_CLIENT_AUTH.into(), json!(false));
    map.insert(attr::NEED_CLIENT_AUTH.into(), json!(false));
    map.insert(attr::TRUST_MANAGER.into(), Value::Null);
    map.insert(attr::PROTOCOLS.into(), json!(protocols));
    map
}

/// Canonical description of a properties realm.
#[must_use]
pub fn properties_realm_description(config: &PropertiesRealmConfig) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(attr::GROUPS_ATTRIBUTE.into(), json!(GROUPS));
    if let Some(groups_file) = &config.groups_file {
        map.insert(
            attr::GROUPS_PROPERTIES.into(),
            file_reference(groups_file, config.relative_to.as_deref(), None),
        );
    }
    map.insert(
        attr::USERS_PROPERTIES.into(),
        file_reference(
            &config.users_file,
            config.relative_to.as_deref(),
            Some(&config.exposed_realm_name),
        ),
    );
    map
}

fn file_reference(path: &str, relative_to: Option<&str>, digest_realm_name: Option<&str>) -> Value {
    let mut file = Map::new();
    file.insert(attr::PATH.into(), json!(path));
    if let Some(relative_to) = relative_to {
        file.insert(attr::RELATIVE_TO.into(), json!(relative_to));
    }
    if let Some(name) = digest_realm_name {
        file.insert(attr::DIGEST_REALM_NAME.into(), json!(name));
    }
    Value::Object(file)
}

/// Element of a security domain's `realms` list.
#[must_use]
pub fn realm_entry(realm: &Realm) -> Value {
    let mut entry = Map::new();
    entry.insert(attr::REALM.into(), json!(realm.name));
    if let Some(decoder) = realm.config.role_decoder() {
        entry.insert(attr::ROLE_DECODER.into(), json!(decoder));
    }
    if let Some(mapper) = realm.config.role_mapper() {
        entry.insert(attr::ROLE_MAPPER.into(), json!(mapper));
    }
    Value::Object(entry)
}

/// Element of a factory's `mechanism-configurations` list.
#[must_use]
pub fn mechanism_entry(mechanism: &AuthMechanism) -> Value {
    let mut entry = Map::new();
    entry.insert(attr::MECHANISM_NAME.into(), json!(mechanism.mechanism_type));
    if let Some(mapper) = mechanism.config.realm_mapper() {
        entry.insert(attr::REALM_MAPPER.into(), json!(mapper));
    } else if let Some(realm) = mechanism.config.realm_name() {
        entry.insert(
            attr::MECHANISM_REALM_CONFIGURATIONS.into(),
            json!([{ attr::REALM_NAME: realm }]),
        );
    }
    Value::Object(entry)
}

/// Reads a mechanism back from a `mechanism-configurations` element.
#[must_use]
pub fn parse_mechanism(entry: &Value) -> Option<AuthMechanism> {
    let mechanism_type = entry.get(attr::MECHANISM_NAME)?.as_str()?.to_string();
    let realm_mapper = entry
        .get(attr::REALM_MAPPER)
        .and_then(Value::as_str)
        .map(str::to_string);
    let realm_name = entry
        .get(attr::MECHANISM_REALM_CONFIGURATIONS)
        .and_then(Value::as_array)
        .and_then(|configs| configs.first())
        .and_then(|c| c.get(attr::REALM_NAME))
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(AuthMechanism {
        mechanism_type,
        config: MechanismConfig::Generic(GenericRealmConfig {
            realm_name,
            realm_mapper,
        }),
    })
}

/// The `mechanism-configurations` elements of a factory.
#[must_use]
pub fn mechanism_configurations(attributes: &Map<String, Value>) -> Vec<Value> {
    attributes
        .get(attr::MECHANISM_CONFIGURATIONS)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Reads a factory back from its attributes.
#[must_use]
pub fn parse_auth_factory(
    name: &str,
    spec: AuthFactorySpec,
    attributes: &Map<String, Value>,
) -> AuthFactory {
    let domain = attributes
        .get(attr::SECURITY_DOMAIN)
        .and_then(Value::as_str)
        .map(SecurityDomain::named)
        .unwrap_or_default();
    let mut factory = AuthFactory::new(name, domain, spec);
    factory.mechanisms = mechanism_configurations(attributes)
        .iter()
        .filter_map(parse_mechanism)
        .collect();
    factory
}

/// `add` of a key store.
#[must_use]
pub fn add_key_store(name: &str, file: &KeyStoreFile) -> Operation {
    Operation::add(
        Address::elytron_resource(ResourceType::KeyStore, name),
        &file.description(),
    )
}

/// `add` of a key manager.
#[must_use]
pub fn add_key_manager(key_manager: &KeyManager) -> Operation {
    Operation::add(
        Address::elytron_resource(ResourceType::KeyManager, &key_manager.name),
        &key_manager_description(key_manager),
    )
}

/// `add` of a server SSL context.
#[must_use]
pub fn add_ssl_context(name: &str, key_manager: &str, protocols: &[String]) -> Operation {
    Operation::add(
        Address::elytron_resource(ResourceType::ServerSslContext, name),
        &ssl_context_description(key_manager, protocols),
    )
}

/// `add` of a properties realm.
#[must_use]
pub fn add_properties_realm(name: &str, config: &PropertiesRealmConfig) -> Operation {
    Operation::add(
        Address::elytron_resource(ResourceType::PropertiesRealm, name),
        &properties_realm_description(config),
    )
}

/// `add` of a key-store realm over a trust store.
#[must_use]
pub fn add_key_store_realm(name: &str, trust_store: &str) -> Operation {
    Operation::new(
        op::ADD,
        Address::elytron_resource(ResourceType::KeyStoreRealm, name),
    )
    .param(attr::KEY_STORE, trust_store)
}

/// `add` of a security domain with its realms.
#[must_use]
pub fn add_security_domain(domain: &SecurityDomain) -> Operation {
    let mut map = Map::new();
    map.insert(
        attr::REALMS.into(),
        Value::Array(domain.realms.iter().map(realm_entry).collect()),
    );
    map.insert(attr::DEFAULT_REALM.into(), json!(domain.default_realm));
    map.insert(
        attr::PERMISSION_MAPPER.into(),
        json!(ely_model::entities::DEFAULT_PERMISSION_MAPPER),
    );
    Operation::add(domain.address(), &map)
}

/// `add` of an authentication factory, without mechanisms.
#[must_use]
pub fn add_auth_factory(factory: &AuthFactory) -> Operation {
    let mut map = Map::new();
    map.insert(
        factory.spec.server_attribute().into(),
        json!(factory.spec.server_value()),
    );
    map.insert(attr::SECURITY_DOMAIN.into(), json!(factory.security_domain.name));
    Operation::add(factory.address(), &map)
}

/// `generate-key-pair` on a key store. A non numeric validity is left out.
#[must_use]
pub fn generate_key_pair(
    key_store: &str,
    distinguished_name: &str,
    alias: &str,
    validity: Option<&str>,
) -> Operation {
    let mut operation = Operation::new(
        op::GENERATE_KEY_PAIR,
        Address::elytron_resource(ResourceType::KeyStore, key_store),
    )
    .param(attr::DISTINGUISHED_NAME, distinguished_name)
    .param(attr::ALGORITHM, KEY_ALGORITHM)
    .param(attr::KEY_SIZE, KEY_SIZE)
    .param(attr::ALIAS, alias);
    if let Some(days) = validity.and_then(|v| v.trim().parse::<u64>().ok()) {
        operation = operation.param(attr::VALIDITY, days);
    }
    operation
}

/// `store` of a key store to its file.
#[must_use]
pub fn store_key_store(key_store: &str) -> Operation {
    Operation::new(
        op::STORE,
        Address::elytron_resource(ResourceType::KeyStore, key_store),
    )
}

/// `export-certificate` of `alias` as PEM next to the key store.
#[must_use]
pub fn export_certificate(key_store: &str, path: &str, alias: &str) -> Operation {
    Operation::new(
        op::EXPORT_CERTIFICATE,
        Address::elytron_resource(ResourceType::KeyStore, key_store),
    )
    .param(attr::PATH, path)
    .param(attr::ALIAS, alias)
    .param(attr::RELATIVE_TO, JBOSS_SERVER_CONFIG_DIR)
    .param(attr::PEM, true)
}

/// `remove` of a key store.
#[must_use]
pub fn remove_key_store(name: &str) -> Operation {
    Operation::remove(Address::elytron_resource(ResourceType::KeyStore, name))
}
