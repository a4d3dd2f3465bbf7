//! Resource types and attribute names of the security subsystem.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Child types of `/subsystem=elytron` handled by the security commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    /// `key-store`
    KeyStore,
    /// `key-manager`
    KeyManager,
    /// `server-ssl-context`
    ServerSslContext,
    /// `properties-realm`
    PropertiesRealm,
    /// `filesystem-realm`
    FilesystemRealm,
    /// `key-store-realm`
    KeyStoreRealm,
    /// `identity-realm`
    IdentityRealm,
    /// `security-domain`
    SecurityDomain,
    /// `http-authentication-factory`
    HttpAuthenticationFactory,
    /// `sasl-authentication-factory`
    SaslAuthenticationFactory,
    /// `simple-role-decoder`
    SimpleRoleDecoder,
}

impl ResourceType {
    /// All resource types, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::KeyStore,
        Self::KeyManager,
        Self::ServerSslContext,
        Self::PropertiesRealm,
        Self::FilesystemRealm,
        Self::KeyStoreRealm,
        Self::IdentityRealm,
        Self::SecurityDomain,
        Self::HttpAuthenticationFactory,
        Self::SaslAuthenticationFactory,
        Self::SimpleRoleDecoder,
    ];

    /// Realm types a security domain may reference.
    pub const REALMS: [Self; 4] = [
        Self::PropertiesRealm,
        Self::FilesystemRealm,
        Self::KeyStoreRealm,
        Self::IdentityRealm,
    ];

    /// Management model name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeyStore => "key-store",
            Self::KeyManager => "key-manager",
            Self::ServerSslContext => "server-ssl-context",
            Self::PropertiesRealm => "properties-realm",
            Self::FilesystemRealm => "filesystem-realm",
            Self::KeyStoreRealm => "key-store-realm",
            Self::IdentityRealm => "identity-realm",
            Self::SecurityDomain => "security-domain",
            Self::HttpAuthenticationFactory => "http-authentication-factory",
            Self::SaslAuthenticationFactory => "sasl-authentication-factory",
            Self::SimpleRoleDecoder => "simple-role-decoder",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ModelError::UnknownResourceType(s.to_string()))
    }
}

/// Attribute and parameter names used in requests and resources.
pub mod attr {
    /// `alias`
    pub const ALIAS: &str = "alias";
    /// `alias-filter`
    pub const ALIAS_FILTER: &str = "alias-filter";
    /// `algorithm`
    pub const ALGORITHM: &str = "algorithm";
    /// `child-type`
    pub const CHILD_TYPE: &str = "child-type";
    /// `clear-text`
    pub const CLEAR_TEXT: &str = "clear-text";
    /// `credential-reference`
    pub const CREDENTIAL_REFERENCE: &str = "credential-reference";
    /// `default-realm`
    pub const DEFAULT_REALM: &str = "default-realm";
    /// `digest-realm-name`
    pub const DIGEST_REALM_NAME: &str = "digest-realm-name";
    /// `distinguished-name`
    pub const DISTINGUISHED_NAME: &str = "distinguished-name";
    /// `groups-attribute`
    pub const GROUPS_ATTRIBUTE: &str = "groups-attribute";
    /// `groups-properties`
    pub const GROUPS_PROPERTIES: &str = "groups-properties";
    /// `http-authentication-factory`
    pub const HTTP_AUTHENTICATION_FACTORY: &str = "http-authentication-factory";
    /// `http-server-mechanism-factory`
    pub const HTTP_SERVER_MECHANISM_FACTORY: &str = "http-server-mechanism-factory";
    /// `http-upgrade`
    pub const HTTP_UPGRADE: &str = "http-upgrade";
    /// `key-manager`
    pub const KEY_MANAGER: &str = "key-manager";
    /// `key-size`
    pub const KEY_SIZE: &str = "key-size";
    /// `key-store`
    pub const KEY_STORE: &str = "key-store";
    /// `mechanism-configurations`
    pub const MECHANISM_CONFIGURATIONS: &str = "mechanism-configurations";
    /// `mechanism-name`
    pub const MECHANISM_NAME: &str = "mechanism-name";
    /// `mechanism-realm-configurations`
    pub const MECHANISM_REALM_CONFIGURATIONS: &str = "mechanism-realm-configurations";
    /// `name`
    pub const NAME: &str = "name";
    /// `need-client-auth`
    pub const NEED_CLIENT_AUTH: &str = "need-client-auth";
    /// `path`
    pub const PATH: &str = "path";
    /// `pem`
    pub const PEM: &str = "pem";
    /// `permission-mapper`
    pub const PERMISSION_MAPPER: &str = "permission-mapper";
    /// `protocols`
    pub const PROTOCOLS: &str = "protocols";
    /// `realm`
    pub const REALM: &str = "realm";
    /// `realm-mapper`
    pub const REALM_MAPPER: &str = "realm-mapper";
    /// `realm-name`
    pub const REALM_NAME: &str = "realm-name";
    /// `realms`
    pub const REALMS: &str = "realms";
    /// `relative-to`
    pub const RELATIVE_TO: &str = "relative-to";
    /// `required`
    pub const REQUIRED: &str = "required";
    /// `role-decoder`
    pub const ROLE_DECODER: &str = "role-decoder";
    /// `role-mapper`
    pub const ROLE_MAPPER: &str = "role-mapper";
    /// `sasl-authentication-factory`
    pub const SASL_AUTHENTICATION_FACTORY: &str = "sasl-authentication-factory";
    /// `sasl-server-factory`
    pub const SASL_SERVER_FACTORY: &str = "sasl-server-factory";
    /// `secure-socket-binding`
    pub const SECURE_SOCKET_BINDING: &str = "secure-socket-binding";
    /// `security-domain`
    pub const SECURITY_DOMAIN: &str = "security-domain";
    /// `security-realm`
    pub const SECURITY_REALM: &str = "security-realm";
    /// `ssl-context`
    pub const SSL_CONTEXT: &str = "ssl-context";
    /// `steps`
    pub const STEPS: &str = "steps";
    /// `trust-manager`
    pub const TRUST_MANAGER: &str = "trust-manager";
    /// `type`
    pub const TYPE: &str = "type";
    /// `users-properties`
    pub const USERS_PROPERTIES: &str = "users-properties";
    /// `validity`
    pub const VALIDITY: &str = "validity";
    /// `value`
    pub const VALUE: &str = "value";
    /// `want-client-auth`
    pub const WANT_CLIENT_AUTH: &str = "want-client-auth";
}
