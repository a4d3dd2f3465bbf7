//! Authentication mechanisms and their realm configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Realm name of the built-in local identity realm.
pub const LOCAL_REALM: &str = "local";

/// Role decoder mapping the `groups` attribute to roles.
pub const GROUPS_TO_ROLES: &str = "groups-to-roles";

/// Role mapper granting the super-user role.
pub const SUPER_USER_MAPPER: &str = "super-user-mapper";

/// Well-known mechanism types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MechanismKind {
    /// SASL `PLAIN`.
    #[serde(rename = "PLAIN")]
    Plain,
    /// SASL `DIGEST-MD5`.
    #[serde(rename = "DIGEST-MD5")]
    DigestMd5,
    /// SASL `EXTERNAL`.
    #[serde(rename = "EXTERNAL")]
    External,
    /// SASL `JBOSS-LOCAL-USER`.
    #[serde(rename = "JBOSS-LOCAL-USER")]
    JbossLocalUser,
    /// HTTP `BASIC`.
    #[serde(rename = "BASIC")]
    Basic,
    /// HTTP `DIGEST`.
    #[serde(rename = "DIGEST")]
    Digest,
    /// HTTP `FORM`.
    #[serde(rename = "FORM")]
    Form,
    /// HTTP `CLIENT-CERT`.
    #[serde(rename = "CLIENT-CERT")]
    ClientCert,
}

impl MechanismKind {
    /// Mechanisms offered over SASL.
    pub const SASL: [Self; 4] = [
        Self::Plain,
        Self::DigestMd5,
        Self::External,
        Self::JbossLocalUser,
    ];

    /// Mechanisms offered over HTTP.
    pub const HTTP: [Self; 4] = [Self::Basic, Self::Digest, Self::Form, Self::ClientCert];

    /// Mechanism name as it appears in `mechanism-configurations`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::DigestMd5 => "DIGEST-MD5",
            Self::External => "EXTERNAL",
            Self::JbossLocalUser => "JBOSS-LOCAL-USER",
            Self::Basic => "BASIC",
            Self::Digest => "DIGEST",
            Self::Form => "FORM",
            Self::ClientCert => "CLIENT-CERT",
        }
    }

    /// Whether the mechanism authenticates against a properties file.
    #[must_use]
    pub const fn uses_properties(self) -> bool {
        matches!(
            self,
            Self::Plain | Self::DigestMd5 | Self::Basic | Self::Digest | Self::Form
        )
    }

    /// Whether the mechanism authenticates with a client certificate.
    #[must_use]
    pub const fn uses_certificate(self) -> bool {
        matches!(self, Self::External | Self::ClientCert)
    }
}

impl fmt::Display for MechanismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MechanismKind {
    type Err = ModelError;

    /// Accepts both the model name (`CLIENT-CERT`) and the option form
    /// (`CLIENT_CERT`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('_', "-");
        Self::SASL
            .into_iter()
            .chain(Self::HTTP)
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| ModelError::invalid_value("mechanism", format!("unknown mechanism {s}")))
    }
}

/// A properties-file realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertiesRealmConfig {
    /// Realm name exposed to clients (the digest realm name).
    pub exposed_realm_name: String,
    /// Users properties file.
    pub users_file: String,
    /// Optional groups properties file.
    pub groups_file: Option<String>,
    /// Path the files are relative to.
    pub relative_to: Option<String>,
}

/// An existing filesystem realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemRealmConfig {
    /// Name of the `filesystem-realm` resource.
    pub realm_name: String,
    /// Role decoder applied to identities of the realm.
    pub role_decoder: String,
}

/// A certificate realm backed by a trust store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustStoreConfig {
    /// Name of the `key-store` used as trust store.
    pub trust_store: String,
    /// Name of the `key-store-realm`, once resolved.
    pub realm_name: Option<String>,
}

impl TrustStoreConfig {
    /// A configuration whose realm has not been resolved yet.
    #[must_use]
    pub fn new(trust_store: impl Into<String>) -> Self {
        Self {
            trust_store: trust_store.into(),
            realm_name: None,
        }
    }

    /// Returns a copy bound to `realm_name`.
    #[must_use]
    pub fn resolved(&self, realm_name: impl Into<String>) -> Self {
        Self {
            trust_store: self.trust_store.clone(),
            realm_name: Some(realm_name.into()),
        }
    }
}

/// The built-in local user realm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUserConfig {
    /// Whether local users are granted the super-user role.
    pub super_user: bool,
}

/// A realm binding read back from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericRealmConfig {
    /// Realm name, if the mechanism names one.
    pub realm_name: Option<String>,
    /// Realm mapper, if the mechanism uses one.
    pub realm_mapper: Option<String>,
}

/// How a mechanism finds its identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MechanismConfig {
    /// Properties files.
    Properties(PropertiesRealmConfig),
    /// Existing filesystem realm.
    FileSystem(FileSystemRealmConfig),
    /// Trust store for certificate authentication.
    TrustStore(TrustStoreConfig),
    /// Local user.
    LocalUser(LocalUserConfig),
    /// Anything else, as read from the store.
    Generic(GenericRealmConfig),
}

impl MechanismConfig {
    /// Realm name bound in `mechanism-realm-configurations`.
    #[must_use]
    pub fn realm_name(&self) -> Option<&str> {
        match self {
            Self::Properties(c) => Some(&c.exposed_realm_name),
            Self::FileSystem(c) => Some(&c.realm_name),
            Self::TrustStore(c) => c.realm_name.as_deref(),
            Self::LocalUser(_) => Some(LOCAL_REALM),
            Self::Generic(c) => c.realm_name.as_deref(),
        }
    }

    /// Realm mapper, if any.
    #[must_use]
    pub fn realm_mapper(&self) -> Option<&str> {
        match self {
            Self::Generic(c) => c.realm_mapper.as_deref(),
            _ => None,
        }
    }

    /// Role decoder to set on the security domain realm entry.
    #[must_use]
    pub fn role_decoder(&self) -> Option<&str> {
        match self {
            Self::Properties(_) => Some(GROUPS_TO_ROLES),
            Self::FileSystem(c) => Some(&c.role_decoder),
            _ => None,
        }
    }

    /// Role mapper to set on the security domain realm entry.
    #[must_use]
    pub fn role_mapper(&self) -> Option<&str> {
        match self {
            Self::LocalUser(c) if c.super_user => Some(SUPER_USER_MAPPER),
            _ => None,
        }
    }
}

/// A mechanism bound to a realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthMechanism {
    /// Mechanism name, for example `BASIC`.
    pub mechanism_type: String,
    /// Realm configuration.
    pub config: MechanismConfig,
}

impl AuthMechanism {
    /// Creates a mechanism of a well-known kind.
    #[must_use]
    pub fn new(kind: MechanismKind, config: MechanismConfig) -> Self {
        Self {
            mechanism_type: kind.as_str().to_string(),
            config,
        }
    }
}
