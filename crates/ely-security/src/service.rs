//! End to end security changes: build, bind to an endpoint, stage.
//!
//! Every function here only reads the store. The returned plan is executed
//! by the caller as one composite, or printed for a dry run. The exception
//! is an interactively generated key store, see [`SslSecurityBuilder`].

use ely_model::mechanism::LOCAL_REALM;
use ely_model::{
    AuthFactory, AuthFactorySpec, AuthMechanism, FileSystemRealmConfig, LocalUserConfig, MechanismConfig,
    MechanismKind, PropertiesRealmConfig, ResourceType, TrustStoreConfig,
};
use ely_store::ResourceStore;

use crate::auth::{self, AuthOutcome, AuthSecurityBuilder};
use crate::client;
use crate::endpoint::{AuthEndpoint, SslBindingOptions, SslEndpoint};
use crate::error::{SecurityError, SecurityResult};
use crate::keystore::Prompter;
use crate::matcher::MatchPolicy;
use crate::plan::ReconciliationPlan;
use crate::ssl::{self, SslOutcome, SslSecurityBuilder};

// ============================================================================
// SSL
// ============================================================================

/// Builds the SSL context chain and binds it to `endpoint`.
///
/// ## Errors
///
/// Returns `SecurityError::Precondition` if SSL is already enabled, and the
/// errors of [`SslSecurityBuilder::build`].
pub async fn plan_enable_ssl(
    store: &dyn ResourceStore,
    endpoint: &SslEndpoint,
    builder: &SslSecurityBuilder,
    binding: &SslBindingOptions,
    prompter: Option<&mut dyn Prompter>,
) -> SecurityResult<SslOutcome> {
    if endpoint.ssl_context(store).await?.is_some() {
        return Err(SecurityError::precondition(format!(
            "SSL is already enabled for {}",
            endpoint.label()
        )));
    }

    let mut outcome = builder.build(store, prompter).await?;
    match endpoint.enable_steps(store, &outcome.ssl_context.name, binding).await {
        Ok(steps) => {
            for step in steps {
                outcome.plan.push(step);
            }
            tracing::debug!(endpoint = %endpoint.label(), steps = outcome.plan.len(), "ssl plan ready");
            Ok(outcome)
        }
        Err(error) => Err(ssl::compensate(store, error, outcome.compensation.as_ref()).await),
    }
}

/// Unbinds the SSL context of `endpoint`.
///
/// ## Errors
///
/// Returns `SecurityError::Precondition` if SSL is not enabled.
pub async fn plan_disable_ssl(
    store: &dyn ResourceStore,
    endpoint: &SslEndpoint,
) -> SecurityResult<ReconciliationPlan> {
    let mut plan = ReconciliationPlan::new();
    for step in endpoint.disable_steps(store).await? {
        plan.push(step);
    }
    Ok(plan)
}

// ============================================================================
// Authentication
// ============================================================================

/// Mechanism options as given by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MechanismOptions {
    /// The mechanism.
    pub kind: MechanismKind,
    /// Users properties file.
    pub user_properties_file: Option<String>,
    /// Groups properties file.
    pub group_properties_file: Option<String>,
    /// Path the properties files are relative to.
    pub relative_to: Option<String>,
    /// Realm name exposed by a properties realm.
    pub user_properties_realm_name: Option<String>,
    /// Existing filesystem realm.
    pub file_system_realm: Option<String>,
    /// Role decoder of the filesystem realm.
    pub user_role_decoder: Option<String>,
    /// Trust store for certificate mechanisms.
    pub trust_store: Option<String>,
    /// Grant local users the super-user role.
    pub super_user: bool,
}

impl MechanismOptions {
    /// Options naming only the mechanism.
    #[must_use]
    pub const fn new(kind: MechanismKind) -> Self {
        Self {
            kind,
            user_properties_file: None,
            group_properties_file: None,
            relative_to: None,
            user_properties_realm_name: None,
            file_system_realm: None,
            user_role_decoder: None,
            trust_store: None,
            super_user: false,
        }
    }
}

/// Names for resources an enable may create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewResourceNames {
    /// Realm name.
    pub realm: Option<String>,
    /// Security domain name.
    pub security_domain: Option<String>,
    /// Authentication factory name.
    pub auth_factory: Option<String>,
}

fn trust_store_option(spec: AuthFactorySpec) -> &'static str {
    match spec {
        AuthFactorySpec::Http => "--client-cert-trust-store",
        AuthFactorySpec::Sasl => "--external-trust-store",
    }
}

/// Turns operator options into a mechanism.
///
/// ## Errors
///
/// Returns `SecurityError::Validation` for inconsistent options and
/// `SecurityError::Precondition` when the trust store or the local identity
/// realm is missing.
pub async fn build_mechanism(
    store: &dyn ResourceStore,
    spec: AuthFactorySpec,
    options: &MechanismOptions,
) -> SecurityResult<AuthMechanism> {
    let offered: &[MechanismKind] = match spec {
        AuthFactorySpec::Http => &MechanismKind::HTTP,
        AuthFactorySpec::Sasl => &MechanismKind::SASL,
    };
    if !offered.contains(&options.kind) {
        return Err(SecurityError::validation(format!(
            "{} is not a {} mechanism",
            options.kind,
            spec.display_name()
        )));
    }

    let config = if options.kind.uses_properties() {
        user_password_config(options)?
    } else if options.kind.uses_certificate() {
        let Some(trust_store) = &options.trust_store else {
            return Err(SecurityError::validation(format!(
                "{} must be set for {}",
                trust_store_option(spec),
                options.kind
            )));
        };
        if !client::security_resource_exists(store, ResourceType::KeyStore, trust_store).await? {
            return Err(SecurityError::precondition(format!(
                "Can't configure 'certificate' authentication, no trustore {trust_store}"
            )));
        }
        MechanismConfig::TrustStore(TrustStoreConfig::new(trust_store.clone()))
    } else {
        let local_realm =
            client::security_resource_exists(store, ResourceType::IdentityRealm, LOCAL_REALM).await?;
        if !local_realm {
            return Err(SecurityError::precondition(
                "Can't configure 'local' user, no such identity.",
            ));
        }
        MechanismConfig::LocalUser(LocalUserConfig {
            super_user: options.super_user,
        })
    };
    Ok(AuthMechanism::new(options.kind, config))
}

fn user_password_config(options: &MechanismOptions) -> SecurityResult<MechanismConfig> {
    match (&options.user_properties_file, &options.file_system_realm) {
        (Some(users_file), None) => {
            let Some(realm_name) = &options.user_properties_realm_name else {
                return Err(SecurityError::validation(
                    "--user-properties-realm-name must be set when using a user properties file",
                ));
            };
            Ok(MechanismConfig::Properties(PropertiesRealmConfig {
                exposed_realm_name: realm_name.clone(),
                users_file: users_file.clone(),
                groups_file: options.group_properties_file.clone(),
                relative_to: options.relative_to.clone(),
            }))
        }
        (None, Some(realm)) => {
            let Some(decoder) = &options.user_role_decoder else {
                return Err(SecurityError::validation(
                    "--user-role-decoder must be set when using a filesystem realm",
                ));
            };
            Ok(MechanismConfig::FileSystem(FileSystemRealmConfig {
                realm_name: realm.clone(),
                role_decoder: decoder.clone(),
            }))
        }
        _ => Err(SecurityError::validation(
            "A properties file or a filesystem-realm name must be provided",
        )),
    }
}

/// Exposes `mechanism` on `endpoint`, or the endpoint's out-of-the-box
/// factory when there is no mechanism.
///
/// An endpoint that already has a factory gets the mechanism added to that
/// factory and is not rebound. The plan is empty when nothing changes.
///
/// ## Errors
///
/// Returns `SecurityError::Precondition` if the out-of-the-box or the
/// active factory is missing, and the errors of
/// [`AuthSecurityBuilder::build`].
pub async fn plan_enable_auth(
    store: &dyn ResourceStore,
    endpoint: &AuthEndpoint,
    mechanism: Option<AuthMechanism>,
    names: NewResourceNames,
    policy: MatchPolicy,
) -> SecurityResult<AuthOutcome> {
    let spec = endpoint.spec();
    let active = endpoint.enabled_factory(store).await?;

    let builder = match mechanism {
        Some(mechanism) => AuthSecurityBuilder::for_mechanism(mechanism, spec)
            .active_factory(active.clone())
            .realm_name(names.realm)
            .security_domain_name(names.security_domain)
            .auth_factory_name(names.auth_factory),
        None => {
            let name = endpoint.out_of_the_box_factory();
            let Some(factory) = auth::get_auth_factory(store, name, spec).await? else {
                return Err(SecurityError::precondition(format!(
                    "Can't enable {} authentication, {name} doesn't exist",
                    spec.display_name()
                )));
            };
            AuthSecurityBuilder::for_out_of_the_box(factory)
        }
    }
    .match_policy(policy);

    let mut outcome = builder.build(store).await?;
    if !builder.is_factory_already_set() && active.as_deref() != Some(outcome.auth_factory.name.as_str()) {
        for step in endpoint.enable_steps(store, &outcome.auth_factory.name).await? {
            outcome.plan.push(step);
        }
    }
    tracing::debug!(
        endpoint = %endpoint.label(),
        factory = %outcome.auth_factory.name,
        steps = outcome.plan.len(),
        "authentication plan ready"
    );
    Ok(outcome)
}

/// Removes `mechanisms` from the factory of `endpoint`, or unbinds the
/// factory when `mechanisms` is empty.
///
/// ## Errors
///
/// Returns `SecurityError::Precondition` if authentication is not enabled
/// or the factory is missing, and the errors of
/// [`auth::remove_mechanisms`].
pub async fn plan_disable_auth(
    store: &dyn ResourceStore,
    endpoint: &AuthEndpoint,
    mechanisms: &[String],
) -> SecurityResult<ReconciliationPlan> {
    let spec = endpoint.spec();
    let Some(factory) = endpoint.enabled_factory(store).await? else {
        return Err(SecurityError::precondition(format!(
            "{} authentication is not enabled.",
            spec.display_name()
        )));
    };
    let address = AuthFactory::existing(factory.clone(), spec).address();
    let Some(attributes) = client::read_resource(store, &address).await? else {
        return Err(SecurityError::precondition(format!("Invalid factory {factory}")));
    };

    let mut plan = ReconciliationPlan::new();
    if mechanisms.is_empty() {
        for step in endpoint.disable_steps() {
            plan.push(step);
        }
    } else {
        plan.push(auth::remove_mechanisms(&attributes, &factory, spec, mechanisms)?);
    }
    Ok(plan)
}

/// Reorders the mechanisms of the SASL factory of a management interface.
///
/// ## Errors
///
/// The errors of [`auth::reorder_sasl_factory`], and
/// `SecurityError::Precondition` if no SASL factory is bound.
pub async fn plan_reorder_sasl(
    store: &dyn ResourceStore,
    interface: &str,
    order: Vec<String>,
) -> SecurityResult<AuthOutcome> {
    let endpoint = AuthEndpoint::ManagementSasl(interface.to_string());
    let active = endpoint.enabled_factory(store).await?;
    AuthSecurityBuilder::for_reorder(order)
        .active_factory(active)
        .build(store)
        .await
}
