//! Common test utilities and fixtures.

use std::sync::Arc;

use ely_cli::cli::SecurityCommand;
use ely_cli::commands::{run_security, Session};
use ely_cli::config::{OutputFormat, SecurityDefaults};
use ely_model::{Address, AuthFactorySpec, ResourceType};
use ely_security::auth;
use ely_store::MemoryStore;
use serde_json::{json, Value};

/// A server holding what a fresh standalone installation ships with.
pub struct TestEnv {
    /// The server's resource tree.
    pub store: Arc<MemoryStore>,
}

impl TestEnv {
    /// Creates an unsecured server with the out-of-the-box security
    /// resources defined but not bound.
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("ely_security=debug")
            .with_test_writer()
            .try_init();

        let store = Arc::new(MemoryStore::new());
        let elytron = |resource_type, name: &str, attributes: Value| {
            store.insert(Address::elytron_resource(resource_type, name), attributes);
        };

        elytron(ResourceType::IdentityRealm, "local", json!({"identity": "$local"}));
        elytron(
            ResourceType::PropertiesRealm,
            "ManagementRealm",
            json!({
                "users-properties": {"path": "mgmt-users.properties", "relative-to": "jboss.server.config.dir",
                                     "digest-realm-name": "ManagementRealm"},
                "groups-properties": {"path": "mgmt-groups.properties", "relative-to": "jboss.server.config.dir"}
            }),
        );
        elytron(
            ResourceType::PropertiesRealm,
            "ApplicationRealm",
            json!({
                "users-properties": {"path": "application-users.properties",
                                     "relative-to": "jboss.server.config.dir",
                                     "digest-realm-name": "ApplicationRealm"},
                "groups-properties": {"path": "application-roles.properties",
                                      "relative-to": "jboss.server.config.dir"}
            }),
        );
        elytron(
            ResourceType::SecurityDomain,
            "ManagementDomain",
            json!({
                "default-realm": "ManagementRealm",
                "realms": [{"realm": "ManagementRealm", "role-decoder": "groups-to-roles"},
                           {"realm": "local", "role-mapper": "super-user-mapper"}]
            }),
        );
        elytron(
            ResourceType::SecurityDomain,
            "ApplicationDomain",
            json!({
                "default-realm": "ApplicationRealm",
                "realms": [{"realm": "ApplicationRealm", "role-decoder": "groups-to-roles"},
                           {"realm": "local"}]
            }),
        );
        elytron(
            ResourceType::HttpAuthenticationFactory,
            "management-http-authentication",
            json!({
                "security-domain": "ManagementDomain",
                "http-server-mechanism-factory": "global",
                "mechanism-configurations": [
                    {"mechanism-name": "DIGEST",
                     "mechanism-realm-configurations": [{"realm-name": "ManagementRealm"}]}
                ]
            }),
        );
        elytron(
            ResourceType::HttpAuthenticationFactory,
            "application-http-authentication",
            json!({
                "security-domain": "ApplicationDomain",
                "http-server-mechanism-factory": "global",
                "mechanism-configurations": [
                    {"mechanism-name": "BASIC",
                     "mechanism-realm-configurations": [{"realm-name": "ApplicationRealm"}]},
                    {"mechanism-name": "FORM"}
                ]
            }),
        );
        elytron(
            ResourceType::SaslAuthenticationFactory,
            "management-sasl-authentication",
            json!({
                "security-domain": "ManagementDomain",
                "sasl-server-factory": "configured",
                "mechanism-configurations": [
                    {"mechanism-name": "JBOSS-LOCAL-USER", "realm-mapper": "local"},
                    {"mechanism-name": "DIGEST-MD5",
                     "mechanism-realm-configurations": [{"realm-name": "ManagementRealm"}]}
                ]
            }),
        );

        store.insert(
            http_interface(),
            json!({"socket-binding": "management-http", "http-upgrade": {"enabled": true}}),
        );
        store.insert(native_interface(), json!({"socket-binding": "management-native"}));
        store.insert(
            https_listener("default-server"),
            json!({"socket-binding": "https", "security-realm": "ApplicationRealm"}),
        );

        Self { store }
    }

    /// Binds the out-of-the-box factories to the HTTP management interface.
    pub fn with_out_of_the_box_bindings(self) -> Self {
        self.store.insert(
            http_interface(),
            json!({
                "socket-binding": "management-http",
                "http-authentication-factory": "management-http-authentication",
                "http-upgrade": {"enabled": true, "sasl-authentication-factory": "management-sasl-authentication"}
            }),
        );
        self
    }

    /// Adds a key store backed by `path`.
    pub fn with_key_store(self, name: &str, path: &str, password: &str) -> Self {
        self.store.insert(
            Address::elytron_resource(ResourceType::KeyStore, name),
            json!({
                "path": path,
                "relative-to": null,
                "credential-reference": {"clear-text": password},
                "type": "JKS",
                "alias-filter": null
            }),
        );
        self
    }

    /// A quiet session executing requests.
    pub fn session(&self) -> Session {
        self.session_with(false)
    }

    /// A quiet session, printing requests instead when `print_request` is set.
    pub fn session_with(&self, print_request: bool) -> Session {
        Session::new(
            self.store.clone(),
            OutputFormat::Quiet,
            print_request,
            SecurityDefaults::default(),
        )
    }

    /// Runs a security command against the server.
    pub async fn run(&self, cmd: SecurityCommand) -> ely_cli::CliResult<()> {
        run_security(cmd, &self.session()).await
    }

    /// A string attribute of `address`.
    pub fn string_attribute(&self, address: &Address, name: &str) -> Option<String> {
        self.store
            .attribute(address, name)
            .and_then(|v| v.as_str().map(str::to_string))
    }

    /// Mechanism names of a factory, in order.
    pub async fn mechanisms(&self, factory: &str, spec: AuthFactorySpec) -> anyhow::Result<Vec<String>> {
        Ok(auth::get_mechanisms(self.store.as_ref(), factory, spec).await?)
    }

    /// `add` operations executed so far, as addresses.
    pub fn executed_adds(&self) -> Vec<String> {
        self.store
            .executed()
            .iter()
            .flat_map(|o| {
                if o.is_composite() {
                    o.steps().unwrap_or_default()
                } else {
                    vec![o.clone()]
                }
            })
            .filter(|o| o.name == "add")
            .map(|o| o.address.to_string())
            .collect()
    }
}

/// The HTTP management interface.
pub fn http_interface() -> Address {
    management_interface("http-interface")
}

/// The native management interface.
pub fn native_interface() -> Address {
    management_interface("native-interface")
}

fn management_interface(name: &str) -> Address {
    Address::root()
        .child("core-service", "management")
        .child("management-interface", name)
}

/// The HTTPS listener of an undertow server.
pub fn https_listener(server: &str) -> Address {
    Address::subsystem("undertow")
        .child("server", server)
        .child("https-listener", "https")
}

/// An undertow application security domain.
pub fn application_security_domain(name: &str) -> Address {
    Address::subsystem("undertow").child("application-security-domain", name)
}
