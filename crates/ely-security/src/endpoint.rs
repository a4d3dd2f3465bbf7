//! Where SSL contexts and authentication factories are bound.
//!
//! Management interfaces live under `core-service=management`, HTTP servers
//! are undertow servers secured through their `https` listener, and
//! applications are secured through undertow application security domains.

use ely_model::address::UNDERTOW_SUBSYSTEM;
use ely_model::entities::{APPLICATION_HTTP_FACTORY, MANAGEMENT_HTTP_FACTORY, MANAGEMENT_SASL_FACTORY};
use ely_model::{attr, Address, AuthFactorySpec, Operation};
use ely_store::ResourceStore;
use serde_json::Map;

use crate::client;
use crate::error::{SecurityError, SecurityResult};
use crate::naming;

const MANAGEMENT_INTERFACE: &str = "management-interface";
const APPLICATION_SECURITY_DOMAIN: &str = "application-security-domain";

// ============================================================================
// SSL
// ============================================================================

/// How an SSL context is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SslBindingOptions {
    /// Socket binding written on a management interface that has none.
    pub secure_socket_binding: String,
    /// Whether the legacy security realm of an HTTPS listener is dropped.
    pub override_security_realm: bool,
}

impl Default for SslBindingOptions {
    fn default() -> Self {
        Self {
            secure_socket_binding: naming::DEFAULT_SECURE_SOCKET_BINDING.to_string(),
            override_security_realm: true,
        }
    }
}

/// An endpoint secured by an SSL context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SslEndpoint {
    /// A management interface.
    Management(String),
    /// The HTTPS listener of an undertow server.
    HttpServer(String),
}

impl SslEndpoint {
    /// The default management interface.
    #[must_use]
    pub fn management(interface: Option<String>) -> Self {
        Self::Management(interface.unwrap_or_else(|| naming::DEFAULT_MANAGEMENT_INTERFACE.to_string()))
    }

    /// The default undertow server.
    #[must_use]
    pub fn http_server(server: Option<String>) -> Self {
        Self::HttpServer(server.unwrap_or_else(|| naming::DEFAULT_SERVER_NAME.to_string()))
    }

    /// Name used in messages.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Management(interface) => format!("management {interface}"),
            Self::HttpServer(server) => server.clone(),
        }
    }

    /// File offered for a generated key store.
    #[must_use]
    pub const fn default_key_store_file(&self) -> &'static str {
        match self {
            Self::Management(_) => naming::DEFAULT_MANAGEMENT_KEY_STORE_FILE,
            Self::HttpServer(_) => naming::DEFAULT_SERVER_KEY_STORE_FILE,
        }
    }

    /// Resource holding the `ssl-context` attribute.
    #[must_use]
    pub fn address(&self) -> Address {
        match self {
            Self::Management(interface) => management_interface(interface),
            Self::HttpServer(server) => https_listener(server),
        }
    }

    /// The SSL context in use, `None` when SSL is disabled.
    ///
    /// ## Errors
    ///
    /// Returns `SecurityError::Store` on transport errors.
    pub async fn ssl_context(&self, store: &dyn ResourceStore) -> SecurityResult<Option<String>> {
        client::read_string_attribute(store, &self.address(), attr::SSL_CONTEXT).await
    }

    /// Steps binding `ssl_context`.
    ///
    /// ## Errors
    ///
    /// Returns `SecurityError::Store` on transport errors.
    pub async fn enable_steps(
        &self,
        store: &dyn ResourceStore,
        ssl_context: &str,
        options: &SslBindingOptions,
    ) -> SecurityResult<Vec<Operation>> {
        let address = self.address();
        let mut steps = vec![Operation::write_attribute(address.clone(), attr::SSL_CONTEXT, ssl_context)];
        match self {
            Self::Management(_) => {
                let binding =
                    client::read_attribute(store, &address, attr::SECURE_SOCKET_BINDING).await?;
                if binding.is_none() {
                    steps.push(Operation::write_attribute(
                        address,
                        attr::SECURE_SOCKET_BINDING,
                        options.secure_socket_binding.as_str(),
                    ));
                }
            }
            Self::HttpServer(_) => {
                if options.override_security_realm {
                    steps.push(Operation::undefine_attribute(address, attr::SECURITY_REALM));
                }
            }
        }
        Ok(steps)
    }

    /// Steps unbinding the SSL context.
    ///
    /// ## Errors
    ///
    /// Returns `SecurityError::Precondition` if SSL is not enabled.
    pub async fn disable_steps(&self, store: &dyn ResourceStore) -> SecurityResult<Vec<Operation>> {
        if self.ssl_context(store).await?.is_none() {
            return Err(SecurityError::precondition(format!(
                "SSL is not enabled for {}",
                self.label()
            )));
        }
        let address = self.address();
        Ok(match self {
            Self::Management(_) => vec![
                Operation::undefine_attribute(address.clone(), attr::SSL_CONTEXT),
                Operation::undefine_attribute(address, attr::SECURE_SOCKET_BINDING),
            ],
            Self::HttpServer(_) => vec![
                Operation::undefine_attribute(address.clone(), attr::SSL_CONTEXT),
                Operation::write_attribute(address, attr::SECURITY_REALM, naming::APPLICATION_REALM),
            ],
        })
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// An endpoint secured by an authentication factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEndpoint {
    /// HTTP authentication of a management interface.
    ManagementHttp(String),
    /// SASL authentication of a management interface.
    ManagementSasl(String),
    /// HTTP authentication of an undertow application security domain.
    Application(String),
}

impl AuthEndpoint {
    /// HTTP or SASL.
    #[must_use]
    pub const fn spec(&self) -> AuthFactorySpec {
        match self {
            Self::ManagementHttp(_) | Self::Application(_) => AuthFactorySpec::Http,
            Self::ManagementSasl(_) => AuthFactorySpec::Sasl,
        }
    }

    /// Name used in messages.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::ManagementHttp(interface) | Self::ManagementSasl(interface) => {
                format!("management {interface}")
            }
            Self::Application(domain) => format!("application security domain {domain}"),
        }
    }

    /// Factory shipped with the server for this endpoint.
    #[must_use]
    pub const fn out_of_the_box_factory(&self) -> &'static str {
        match self {
            Self::ManagementHttp(_) => MANAGEMENT_HTTP_FACTORY,
            Self::ManagementSasl(_) => MANAGEMENT_SASL_FACTORY,
            Self::Application(_) => APPLICATION_HTTP_FACTORY,
        }
    }

    fn address(&self) -> Address {
        match self {
            Self::ManagementHttp(interface) | Self::ManagementSasl(interface) => {
                management_interface(interface)
            }
            Self::Application(domain) => application_security_domain(domain),
        }
    }

    /// Attribute naming the factory. SASL over HTTP is configured on the
    /// upgrade; the native interface takes the factory directly.
    fn attribute(&self) -> String {
        match self {
            Self::ManagementSasl(interface) if interface != naming::NATIVE_INTERFACE => {
                format!("{}.{}", attr::HTTP_UPGRADE, attr::SASL_AUTHENTICATION_FACTORY)
            }
            Self::ManagementSasl(_) => attr::SASL_AUTHENTICATION_FACTORY.to_string(),
            Self::ManagementHttp(_) | Self::Application(_) => {
                attr::HTTP_AUTHENTICATION_FACTORY.to_string()
            }
        }
    }

    /// The factory in use, `None` when authentication is not enabled.
    ///
    /// ## Errors
    ///
    /// Returns `SecurityError::Store` on transport errors.
    pub async fn enabled_factory(&self, store: &dyn ResourceStore) -> SecurityResult<Option<String>> {
        let address = self.address();
        match self.attribute().split_once('.') {
            None => client::read_string_attribute(store, &address, &self.attribute()).await,
            Some((parent, child)) => Ok(client::read_attribute(store, &address, parent)
                .await?
                .and_then(|v| v.get(child).and_then(|c| c.as_str()).map(str::to_string))),
        }
    }

    /// Steps binding `factory`.
    ///
    /// ## Errors
    ///
    /// Returns `SecurityError::Store` on transport errors.
    pub async fn enable_steps(
        &self,
        store: &dyn ResourceStore,
        factory: &str,
    ) -> SecurityResult<Vec<Operation>> {
        let address = self.address();
        if let Self::Application(domain) = self {
            if !store.exists(&address).await? {
                tracing::debug!(%domain, "adding application security domain");
                let mut attributes = Map::new();
                attributes.insert(attr::HTTP_AUTHENTICATION_FACTORY.to_string(), factory.into());
                return Ok(vec![Operation::add(address, &attributes)]);
            }
        }
        Ok(vec![Operation::write_attribute(address, &self.attribute(), factory)])
    }

    /// Steps unbinding the factory.
    #[must_use]
    pub fn disable_steps(&self) -> Vec<Operation> {
        match self {
            Self::Application(_) => vec![Operation::remove(self.address())],
            _ => vec![Operation::undefine_attribute(self.address(), &self.attribute())],
        }
    }
}

/// Names of the undertow application security domains.
pub async fn application_security_domains(store: &dyn ResourceStore) -> Vec<String> {
    client::children_names(store, &Address::subsystem(UNDERTOW_SUBSYSTEM), APPLICATION_SECURITY_DOMAIN)
        .await
}

fn management_interface(interface: &str) -> Address {
    Address::root()
        .child("core-service", "management")
        .child(MANAGEMENT_INTERFACE, interface)
}

fn https_listener(server: &str) -> Address {
    Address::subsystem(UNDERTOW_SUBSYSTEM)
        .child("server", server)
        .child("https-listener", naming::DEFAULT_HTTPS_LISTENER)
}

fn application_security_domain(domain: &str) -> Address {
    Address::subsystem(UNDERTOW_SUBSYSTEM).child(APPLICATION_SECURITY_DOMAIN, domain)
}

#[cfg(test)]
mod tests {
    use ely_model::ResourceType;
    use ely_store::MemoryStore;
    use serde_json::json;

    use super::*;

    fn store_with_interfaces() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert(
            management_interface("http-interface"),
            json!({"http-upgrade": {"enabled": true}, "socket-binding": "management-http"}),
        );
        store.insert(management_interface("native-interface"), json!({}));
        store.insert(https_listener("default-server"), json!({"security-realm": "ApplicationRealm"}));
        store.insert(
            Address::elytron_resource(ResourceType::ServerSslContext, "ctx"),
            json!({"key-manager": "km"}),
        );
        store
    }

    #[tokio::test]
    async fn management_ssl_writes_socket_binding_once() {
        let store = store_with_interfaces();
        let endpoint = SslEndpoint::management(None);
        assert_eq!(endpoint.label(), "management http-interface");

        let steps = endpoint
            .enable_steps(&store, "ctx", &SslBindingOptions::default())
            .await
            .unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].param_str(attr::VALUE), Some("management-https"));

        store.insert(
            management_interface("http-interface"),
            json!({"secure-socket-binding": "custom"}),
        );
        let steps = endpoint
            .enable_steps(&store, "ctx", &SslBindingOptions::default())
            .await
            .unwrap();
        assert_eq!(steps.len(), 1);
    }

    #[tokio::test]
    async fn http_server_ssl_round_trip() {
        let store = store_with_interfaces();
        let endpoint = SslEndpoint::http_server(None);
        assert!(endpoint.ssl_context(&store).await.unwrap().is_none());

        let steps = endpoint
            .enable_steps(&store, "ctx", &SslBindingOptions::default())
            .await
            .unwrap();
        client::execute(&store, &Operation::composite(steps)).await.unwrap();
        assert_eq!(endpoint.ssl_context(&store).await.unwrap().as_deref(), Some("ctx"));
        assert!(store.attribute(&endpoint.address(), attr::SECURITY_REALM).is_none());

        let steps = endpoint.disable_steps(&store).await.unwrap();
        client::execute(&store, &Operation::composite(steps)).await.unwrap();
        assert!(endpoint.ssl_context(&store).await.unwrap().is_none());
        assert_eq!(
            store.attribute(&endpoint.address(), attr::SECURITY_REALM),
            Some(json!("ApplicationRealm"))
        );
    }

    #[tokio::test]
    async fn security_realm_can_be_kept() {
        let store = store_with_interfaces();
        let options = SslBindingOptions {
            override_security_realm: false,
            ..SslBindingOptions::default()
        };
        let steps = SslEndpoint::http_server(None)
            .enable_steps(&store, "ctx", &options)
            .await
            .unwrap();
        assert_eq!(steps.len(), 1);
    }

    #[tokio::test]
    async fn disabling_disabled_ssl_is_refused() {
        let store = store_with_interfaces();
        let err = SslEndpoint::management(Some("native-interface".into()))
            .disable_steps(&store)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "SSL is not enabled for management native-interface");
    }

    #[tokio::test]
    async fn sasl_factory_location_depends_on_interface() {
        let store = store_with_interfaces();
        store.insert(
            Address::elytron_resource(ResourceType::SaslAuthenticationFactory, "sasl"),
            json!({}),
        );

        for interface in ["http-interface", "native-interface"] {
            let endpoint = AuthEndpoint::ManagementSasl(interface.to_string());
            assert!(endpoint.enabled_factory(&store).await.unwrap().is_none());
            let steps = endpoint.enable_steps(&store, "sasl").await.unwrap();
            client::execute(&store, &Operation::composite(steps)).await.unwrap();
            assert_eq!(endpoint.enabled_factory(&store).await.unwrap().as_deref(), Some("sasl"));
        }
        assert_eq!(
            store.attribute(&management_interface("http-interface"), "http-upgrade.enabled"),
            Some(json!(true))
        );
        assert_eq!(
            store.attribute(&management_interface("native-interface"), attr::SASL_AUTHENTICATION_FACTORY),
            Some(json!("sasl"))
        );

        let endpoint = AuthEndpoint::ManagementSasl("http-interface".into());
        client::execute(&store, &Operation::composite(endpoint.disable_steps()))
            .await
            .unwrap();
        assert!(endpoint.enabled_factory(&store).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn application_domain_is_added_then_updated() {
        let store = store_with_interfaces();
        for name in ["first", "second"] {
            store.insert(
                Address::elytron_resource(ResourceType::HttpAuthenticationFactory, name),
                json!({}),
            );
        }
        let endpoint = AuthEndpoint::Application("other".into());
        assert_eq!(endpoint.label(), "application security domain other");

        let steps = endpoint.enable_steps(&store, "first").await.unwrap();
        assert_eq!(steps[0].name, ely_model::op::ADD);
        client::execute(&store, &Operation::composite(steps)).await.unwrap();
        assert_eq!(application_security_domains(&store).await, vec!["other"]);

        let steps = endpoint.enable_steps(&store, "second").await.unwrap();
        assert_eq!(steps[0].name, ely_model::op::WRITE_ATTRIBUTE);
        client::execute(&store, &Operation::composite(steps)).await.unwrap();
        assert_eq!(endpoint.enabled_factory(&store).await.unwrap().as_deref(), Some("second"));

        client::execute(&store, &Operation::composite(endpoint.disable_steps()))
            .await
            .unwrap();
        assert!(application_security_domains(&store).await.is_empty());
    }
}
