//! Default resource names.
//!
//! Every function here is pure. Builders only fall back to these names when
//! the caller did not give one.

use ely_model::{AuthFactorySpec, AuthMechanism};

/// Management interface secured when none is given.
pub const DEFAULT_MANAGEMENT_INTERFACE: &str = "http-interface";

/// Management interface speaking the native protocol.
pub const NATIVE_INTERFACE: &str = "native-interface";

/// Web server secured when none is given.
pub const DEFAULT_SERVER_NAME: &str = "default-server";

/// Socket binding used for HTTPS management when none is defined.
pub const DEFAULT_SECURE_SOCKET_BINDING: &str = "management-https";

/// HTTPS listener of a web server.
pub const DEFAULT_HTTPS_LISTENER: &str = "https";

/// Key store file generated for the management interfaces.
pub const DEFAULT_MANAGEMENT_KEY_STORE_FILE: &str = "management.keystore";

/// Key store file generated for a web server.
pub const DEFAULT_SERVER_KEY_STORE_FILE: &str = "server.keystore";

/// Legacy security realm restored when SSL is disabled on a web server.
pub const APPLICATION_REALM: &str = "ApplicationRealm";

/// Protocol enabled on new SSL contexts.
pub const DEFAULT_PROTOCOL: &str = "TLSv1.2";

/// `key-store-<file name>`.
#[must_use]
pub fn key_store_name(path: &str) -> String {
    format!("key-store-{}", file_name(path))
}

/// `key-manager-<key store>`.
#[must_use]
pub fn key_manager_name(key_store: &str) -> String {
    format!("key-manager-{key_store}")
}

/// `ssl-context-<key store>`.
#[must_use]
pub fn ssl_context_name(key_store: &str) -> String {
    format!("ssl-context-{key_store}")
}

/// `<exposed realm name>-properties-realm`.
#[must_use]
pub fn properties_realm_name(exposed_realm_name: &str) -> String {
    format!("{exposed_realm_name}-properties-realm")
}

/// `<realm>-security-domain`.
#[must_use]
pub fn security_domain_name(realm: &str) -> String {
    format!("{realm}-security-domain")
}

/// `<realm>-<http|sasl>-authentication-factory`, using the realm mapper when
/// the mechanism names no realm.
#[must_use]
pub fn auth_factory_name(mechanism: &AuthMechanism, spec: AuthFactorySpec) -> String {
    let base = mechanism
        .config
        .realm_name()
        .or_else(|| mechanism.config.realm_mapper())
        .unwrap_or("default");
    format!("{base}-{}-authentication-factory", spec.label())
}

/// `ks-realm-<trust store>`.
#[must_use]
pub fn key_store_realm_name(trust_store: &str) -> String {
    format!("ks-realm-{trust_store}")
}

/// Names of the chain built around a generated key store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedNames {
    /// Key store name.
    pub key_store: String,
    /// Key manager name.
    pub key_manager: String,
    /// SSL context name.
    pub ssl_context: String,
}

/// Names derived from a random identifier, for generated key material.
#[must_use]
pub fn generated_names(id: &str) -> GeneratedNames {
    GeneratedNames {
        key_store: format!("key-store-{id}"),
        key_manager: format!("key-manager-{id}"),
        ssl_context: format!("ssl-context-{id}"),
    }
}

/// Key store type implied by a file extension: `PKCS12` for `.p12` and
/// `.pfx`, `JKS` otherwise.
#[must_use]
pub fn key_store_type(path: &str) -> &'static str {
    let lower = file_name(path).to_ascii_lowercase();
    if lower.ends_with(".p12") || lower.ends_with(".pfx") {
        "PKCS12"
    } else {
        "JKS"
    }
}

/// Protocols enabled on new SSL contexts.
#[must_use]
pub fn default_protocols() -> Vec<String> {
    vec![DEFAULT_PROTOCOL.to_string()]
}

/// Splits a comma separated protocol list; runs of commas count as one.
#[must_use]
pub fn split_protocols(protocols: &str) -> Vec<String> {
    protocols
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// `base` if it is not taken, else the first free `base-<n>`.
#[must_use]
pub fn unique_name(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|t| t == base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.iter().any(|t| t == candidate))
        .unwrap_or_else(|| base.to_string())
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
