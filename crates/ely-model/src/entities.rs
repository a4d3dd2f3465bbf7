//! Local descriptors of security resources.
//!
//! Each value correlates to a resource in the store by type and name. The
//! `exists` flags record whether the resource was discovered rather than
//! created during the current invocation.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::mechanism::{AuthMechanism, MechanismConfig};
use crate::resource::{attr, ResourceType};

/// Built-in SASL factory of the management interface.
pub const MANAGEMENT_SASL_FACTORY: &str = "management-sasl-authentication";

/// Built-in HTTP factory of the management interface.
pub const MANAGEMENT_HTTP_FACTORY: &str = "management-http-authentication";

/// Built-in HTTP factory for applications.
pub const APPLICATION_HTTP_FACTORY: &str = "application-http-authentication";

/// Permission mapper set on new security domains.
pub const DEFAULT_PERMISSION_MAPPER: &str = "default-permission-mapper";

/// A key store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStore {
    /// Resource name.
    pub name: String,
    /// Clear-text password, when known.
    pub password: Option<String>,
    /// Alias of the key entry, when known.
    pub alias: Option<String>,
    /// Whether the key store was discovered.
    pub exists: bool,
}

impl KeyStore {
    /// Creates a key store descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, password: Option<String>, exists: bool) -> Self {
        Self {
            name: name.into(),
            password,
            alias: None,
            exists,
        }
    }

    /// Sets the alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Address of the resource.
    #[must_use]
    pub fn address(&self) -> Address {
        Address::elytron_resource(ResourceType::KeyStore, &self.name)
    }
}

/// A key manager over a key store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyManager {
    /// Resource name.
    pub name: String,
    /// Key store it reads keys from.
    pub key_store: KeyStore,
    /// Whether the key manager was discovered.
    pub exists: bool,
}

/// A server-side SSL context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSslContext {
    /// Resource name.
    pub name: String,
    /// Key manager it uses.
    pub key_manager: KeyManager,
    /// Whether the context was discovered.
    pub exists: bool,
}

impl ServerSslContext {
    /// Names of the chain as `(ssl context, key manager, key store)`.
    #[must_use]
    pub fn names(&self) -> (&str, &str, &str) {
        (
            &self.name,
            &self.key_manager.name,
            &self.key_manager.key_store.name,
        )
    }
}

/// An authentication realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realm {
    /// Resource name.
    pub name: String,
    /// How mechanisms bind to it.
    pub config: MechanismConfig,
    /// Whether the realm was discovered.
    pub existing: bool,
}

/// A security domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityDomain {
    /// Resource name.
    pub name: String,
    /// Realms, in declaration order.
    pub realms: Vec<Realm>,
    /// Default realm name.
    pub default_realm: Option<String>,
}

impl SecurityDomain {
    /// A domain known only by name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A new domain holding a single realm, which is also its default.
    #[must_use]
    pub fn with_realm(name: impl Into<String>, realm: Realm) -> Self {
        Self {
            name: name.into(),
            default_realm: Some(realm.name.clone()),
            realms: vec![realm],
        }
    }

    /// Address of the resource.
    #[must_use]
    pub fn address(&self) -> Address {
        Address::elytron_resource(ResourceType::SecurityDomain, &self.name)
    }
}

/// Protocol an authentication factory serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthFactorySpec {
    /// `http-authentication-factory`.
    Http,
    /// `sasl-authentication-factory`.
    Sasl,
}

impl AuthFactorySpec {
    /// Resource type of factories of this kind.
    #[must_use]
    pub const fn resource_type(self) -> ResourceType {
        match self {
            Self::Http => ResourceType::HttpAuthenticationFactory,
            Self::Sasl => ResourceType::SaslAuthenticationFactory,
        }
    }

    /// Attribute naming the server-side mechanism factory.
    #[must_use]
    pub const fn server_attribute(self) -> &'static str {
        match self {
            Self::Http => attr::HTTP_SERVER_MECHANISM_FACTORY,
            Self::Sasl => attr::SASL_SERVER_FACTORY,
        }
    }

    /// Value of [`Self::server_attribute`] on new factories.
    #[must_use]
    pub const fn server_value(self) -> &'static str {
        match self {
            Self::Http => "global",
            Self::Sasl => "configured",
        }
    }

    /// Short lowercase label, used in default names.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Sasl => "sasl",
        }
    }

    /// Uppercase label for reports and messages.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Sasl => "SASL",
        }
    }
}

/// An authentication factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFactory {
    /// Resource name.
    pub name: String,
    /// Security domain it authenticates against.
    pub security_domain: SecurityDomain,
    /// Mechanisms, in order of preference.
    pub mechanisms: Vec<AuthMechanism>,
    /// HTTP or SASL.
    pub spec: AuthFactorySpec,
}

impl AuthFactory {
    /// Creates a factory without mechanisms.
    #[must_use]
    pub fn new(name: impl Into<String>, security_domain: SecurityDomain, spec: AuthFactorySpec) -> Self {
        Self {
            name: name.into(),
            security_domain,
            mechanisms: Vec::new(),
            spec,
        }
    }

    /// A pre-existing factory known only by name.
    #[must_use]
    pub fn existing(name: impl Into<String>, spec: AuthFactorySpec) -> Self {
        Self::new(name, SecurityDomain::default(), spec)
    }

    /// Address of the resource.
    #[must_use]
    pub fn address(&self) -> Address {
        Address::elytron_resource(self.spec.resource_type(), &self.name)
    }

    /// Names of the mechanisms, in order.
    #[must_use]
    pub fn mechanism_names(&self) -> Vec<&str> {
        self.mechanisms
            .iter()
            .map(|m| m.mechanism_type.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanism::LocalUserConfig;

    #[test]
    fn factory_spec_attributes() {
        assert_eq!(
            AuthFactorySpec::Http.resource_type(),
            ResourceType::HttpAuthenticationFactory
        );
        assert_eq!(AuthFactorySpec::Http.server_attribute(), "http-server-mechanism-factory");
        assert_eq!(AuthFactorySpec::Http.server_value(), "global");
        assert_eq!(AuthFactorySpec::Sasl.server_attribute(), "sasl-server-factory");
        assert_eq!(AuthFactorySpec::Sasl.server_value(), "configured");
    }

    #[test]
    fn domain_with_realm_sets_default() {
        let realm = Realm {
            name: "local".into(),
            config: MechanismConfig::LocalUser(LocalUserConfig::default()),
            existing: true,
        };
        let domain = SecurityDomain::with_realm("sd", realm);
        assert_eq!(domain.default_realm.as_deref(), Some("local"));
        assert_eq!(domain.address().to_string(), "/subsystem=elytron/security-domain=sd");
    }
}
