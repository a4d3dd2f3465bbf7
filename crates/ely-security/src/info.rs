//! What is currently secured, and how.

use ely_model::{attr, Address, AuthFactorySpec, ResourceType};
use ely_store::ResourceStore;
use serde::Serialize;

use crate::auth;
use crate::client;
use crate::endpoint::{self, AuthEndpoint, SslEndpoint};
use crate::error::SecurityResult;
use crate::naming;

/// SSL state of an endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SslInfo {
    /// Whether an SSL context is bound.
    pub enabled: bool,
    /// The bound SSL context.
    pub ssl_context: Option<String>,
    /// Its key manager.
    pub key_manager: Option<String>,
    /// The key store of the key manager.
    pub key_store: Option<String>,
}

impl SslInfo {
    /// Report lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("SSL enabled: {}", self.enabled)];
        if let Some(ssl_context) = &self.ssl_context {
            lines.push(format!("Server SSLContext: {ssl_context}"));
            lines.push(format!("Key Manager: {}", self.key_manager.as_deref().unwrap_or_default()));
            lines.push(format!("Key Store: {}", self.key_store.as_deref().unwrap_or_default()));
        }
        lines
    }
}

/// One mechanism of a factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MechanismInfo {
    /// Mechanism name.
    pub mechanism: String,
    /// Realm mapper, if any.
    pub realm_mapper: Option<String>,
    /// Realm name, if any.
    pub realm_name: Option<String>,
}

impl MechanismInfo {
    /// `TYPE realm-mapper=.. realm-name=..`, omitting what is unset.
    #[must_use]
    pub fn line(&self) -> String {
        let mut line = self.mechanism.clone();
        if let Some(mapper) = &self.realm_mapper {
            line.push_str(&format!(" realm-mapper={mapper}"));
        }
        if let Some(realm) = &self.realm_name {
            line.push_str(&format!(" realm-name={realm}"));
        }
        line
    }
}

/// Authentication state of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthInfo {
    /// HTTP or SASL.
    pub spec: AuthFactorySpec,
    /// Whether a factory is bound.
    pub enabled: bool,
    /// The bound factory.
    pub factory: Option<String>,
    /// Security domain of the factory.
    pub security_domain: Option<String>,
    /// Mechanisms of the factory, in order.
    pub mechanisms: Vec<MechanismInfo>,
}

impl AuthInfo {
    fn disabled(spec: AuthFactorySpec) -> Self {
        Self {
            spec,
            enabled: false,
            factory: None,
            security_domain: None,
            mechanisms: Vec::new(),
        }
    }

    /// Report lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} authentication enabled: {}",
            self.spec.display_name(),
            self.enabled
        )];
        if let Some(factory) = &self.factory {
            lines.push(format!("Authentication Factory: {factory}"));
            lines.push(format!(
                "Security Domain: {}",
                self.security_domain.as_deref().unwrap_or_default()
            ));
            lines.push("Mechanisms:".to_string());
            lines.extend(self.mechanisms.iter().map(MechanismInfo::line));
        }
        lines
    }
}

/// Security of one management interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceInfo {
    /// Interface name.
    pub interface: String,
    /// SSL state.
    pub ssl: SslInfo,
    /// HTTP authentication; `None` on interfaces that do not serve HTTP.
    pub http: Option<AuthInfo>,
    /// SASL authentication.
    pub sasl: AuthInfo,
}

/// Security of the management interfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagementInfo {
    /// HTTP interface first, then native.
    pub interfaces: Vec<InterfaceInfo>,
}

impl ManagementInfo {
    /// Report lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for interface in &self.interfaces {
            lines.push(String::new());
            lines.push(interface.interface.clone());
            lines.push(String::new());
            lines.extend(interface.ssl.lines());
            if let Some(http) = &interface.http {
                lines.push(String::new());
                lines.extend(http.lines());
            }
            lines.push(String::new());
            lines.extend(interface.sasl.lines());
        }
        lines.push(String::new());
        lines
    }
}

/// HTTP authentication of an application security domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationDomainInfo {
    /// Domain name.
    pub name: String,
    /// Authentication state.
    pub http: AuthInfo,
}

/// Security of an HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpServerInfo {
    /// Server name.
    pub server: String,
    /// SSL state of its HTTPS listener.
    pub ssl: SslInfo,
    /// Application security domains.
    pub application_security_domains: Vec<ApplicationDomainInfo>,
}

impl HttpServerInfo {
    /// Report lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![String::new(), format!("HTTP Server: {}", self.server), String::new()];
        lines.extend(self.ssl.lines());
        lines.push(String::new());
        if self.application_security_domains.is_empty() {
            lines.push("No application security domains.".to_string());
        }
        for domain in &self.application_security_domains {
            lines.push(domain.name.clone());
            lines.extend(domain.http.lines());
            lines.push(String::new());
        }
        lines
    }
}

/// Reads the SSL state of `endpoint`.
///
/// ## Errors
///
/// Returns `SecurityError::Store` on transport errors.
pub async fn ssl_info(store: &dyn ResourceStore, endpoint: &SslEndpoint) -> SecurityResult<SslInfo> {
    let Some(ssl_context) = endpoint.ssl_context(store).await? else {
        return Ok(SslInfo::default());
    };
    let key_manager = client::read_string_attribute(
        store,
        &Address::elytron_resource(ResourceType::ServerSslContext, &ssl_context),
        attr::KEY_MANAGER,
    )
    .await?;
    let key_store = match &key_manager {
        Some(km) => {
            client::read_string_attribute(
                store,
                &Address::elytron_resource(ResourceType::KeyManager, km),
                attr::KEY_STORE,
            )
            .await?
        }
        None => None,
    };
    Ok(SslInfo {
        enabled: true,
        ssl_context: Some(ssl_context),
        key_manager,
        key_store,
    })
}

/// Reads the authentication state of `endpoint`.
///
/// ## Errors
///
/// Returns `SecurityError::Store` on transport errors.
pub async fn auth_info(store: &dyn ResourceStore, endpoint: &AuthEndpoint) -> SecurityResult<AuthInfo> {
    let spec = endpoint.spec();
    let Some(name) = endpoint.enabled_factory(store).await? else {
        return Ok(AuthInfo::disabled(spec));
    };
    let factory = auth::get_auth_factory(store, &name, spec).await?;
    let (security_domain, mechanisms) = match factory {
        Some(factory) => (
            Some(factory.security_domain.name).filter(|n| !n.is_empty()),
            factory
                .mechanisms
                .into_iter()
                .map(|m| MechanismInfo {
                    realm_mapper: m.config.realm_mapper().map(str::to_string),
                    realm_name: m.config.realm_name().map(str::to_string),
                    mechanism: m.mechanism_type,
                })
                .collect(),
        ),
        None => {
            tracing::warn!(factory = %name, "bound factory does not exist");
            (None, Vec::new())
        }
    };
    Ok(AuthInfo {
        spec,
        enabled: true,
        factory: Some(name),
        security_domain,
        mechanisms,
    })
}

/// Reads the security of both management interfaces.
///
/// ## Errors
///
/// Returns `SecurityError::Store` on transport errors.
pub async fn management_info(store: &dyn ResourceStore) -> SecurityResult<ManagementInfo> {
    let mut interfaces = Vec::new();
    for (interface, serves_http) in [
        (naming::DEFAULT_MANAGEMENT_INTERFACE, true),
        (naming::NATIVE_INTERFACE, false),
    ] {
        let http = if serves_http {
            Some(auth_info(store, &AuthEndpoint::ManagementHttp(interface.to_string())).await?)
        } else {
            None
        };
        interfaces.push(InterfaceInfo {
            interface: interface.to_string(),
            ssl: ssl_info(store, &SslEndpoint::Management(interface.to_string())).await?,
            http,
            sasl: auth_info(store, &AuthEndpoint::ManagementSasl(interface.to_string())).await?,
        });
    }
    Ok(ManagementInfo { interfaces })
}

/// Reads the security of an HTTP server and of every application security
/// domain.
///
/// ## Errors
///
/// Returns `SecurityError::Store` on transport errors.
pub async fn http_server_info(store: &dyn ResourceStore, server: Option<String>) -> SecurityResult<HttpServerInfo> {
    let endpoint = SslEndpoint::http_server(server);
    let ssl = ssl_info(store, &endpoint).await?;
    let mut application_security_domains = Vec::new();
    for name in endpoint::application_security_domains(store).await {
        let http = auth_info(store, &AuthEndpoint::Application(name.clone())).await?;
        application_security_domains.push(ApplicationDomainInfo { name, http });
    }
    Ok(HttpServerInfo {
        server: endpoint.label(),
        ssl,
        application_security_domains,
    })
}
