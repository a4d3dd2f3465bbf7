//! Authentication factory construction.
//!
//! A mechanism is exposed through a realm, a security domain and an
//! authentication factory. Existing resources are reused when they already
//! expose the mechanism the same way; lists on existing resources are
//! rewritten whole with a single `write-attribute`.

use ely_model::{
    attr, AuthFactory, AuthFactorySpec, AuthMechanism, MechanismConfig, Operation, Realm,
    ResourceType, SecurityDomain,
};
use ely_store::ResourceStore;
use serde_json::{Map, Value};

use crate::client;
use crate::elytron;
use crate::error::{SecurityError, SecurityResult};
use crate::matcher::{MatchPolicy, ResourceMatcher};
use crate::naming;
use crate::plan::ReconciliationPlan;

/// What the builder does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Expose a new mechanism.
    Mechanism(AuthMechanism),
    /// Use a factory shipped with the server as is.
    OutOfTheBox(AuthFactory),
    /// Reorder the mechanisms of the active SASL factory.
    Reorder(Vec<String>),
}

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    /// The factory the endpoint should use.
    pub auth_factory: AuthFactory,
    /// Steps to execute; empty when everything is already in place.
    pub plan: ReconciliationPlan,
}

/// What the store already holds for a realm.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealmLookup {
    /// An existing realm equivalent to the one requested.
    pub found: Option<String>,
    /// Names already taken by realms of the same type.
    pub taken: Vec<String>,
}

/// Builds the realm a mechanism authenticates against.
///
/// The returned configuration is the input with any name resolved here
/// filled in. A realm that is not `existing` must be added.
#[must_use]
pub fn build_realm(
    config: &MechanismConfig,
    lookup: RealmLookup,
    new_name: Option<&str>,
) -> (Realm, MechanismConfig) {
    match config {
        MechanismConfig::Properties(properties) => {
            let existing = lookup.found.is_some();
            let name = lookup.found.unwrap_or_else(|| match new_name {
                Some(name) => name.to_string(),
                None => naming::unique_name(
                    &naming::properties_realm_name(&properties.exposed_realm_name),
                    &lookup.taken,
                ),
            });
            (
                Realm {
                    name,
                    config: config.clone(),
                    existing,
                },
                config.clone(),
            )
        }
        MechanismConfig::TrustStore(trust_store) => {
            let existing = lookup.found.is_some();
            let name = lookup
                .found
                .unwrap_or_else(|| naming::key_store_realm_name(&trust_store.trust_store));
            let resolved = MechanismConfig::TrustStore(trust_store.resolved(name.clone()));
            (
                Realm {
                    name,
                    config: resolved.clone(),
                    existing,
                },
                resolved,
            )
        }
        other => (
            Realm {
                name: other.realm_name().unwrap_or_default().to_string(),
                config: other.clone(),
                existing: true,
            },
            other.clone(),
        ),
    }
}

/// The `add` of a realm [`build_realm`] did not find.
#[must_use]
pub fn realm_add_step(realm: &Realm) -> Option<Operation> {
    if realm.existing {
        return None;
    }
    match &realm.config {
        MechanismConfig::Properties(properties) => {
            Some(elytron::add_properties_realm(&realm.name, properties))
        }
        MechanismConfig::TrustStore(trust_store) => Some(elytron::add_key_store_realm(
            &realm.name,
            &trust_store.trust_store,
        )),
        _ => None,
    }
}

/// Reads a factory; `None` if it does not exist.
///
/// ## Errors
///
/// Returns `SecurityError::Store` on transport errors.
pub async fn get_auth_factory(
    store: &dyn ResourceStore,
    name: &str,
    spec: AuthFactorySpec,
) -> SecurityResult<Option<AuthFactory>> {
    let address = AuthFactory::existing(name, spec).address();
    Ok(client::read_resource(store, &address)
        .await?
        .map(|attributes| elytron::parse_auth_factory(name, spec, &attributes)))
}

/// Mechanism names of a factory, in order.
///
/// ## Errors
///
/// Returns `SecurityError::Precondition` if the factory is missing or has
/// no mechanisms.
pub async fn get_mechanisms(
    store: &dyn ResourceStore,
    name: &str,
    spec: AuthFactorySpec,
) -> SecurityResult<Vec<String>> {
    let attributes = read_factory(store, name, spec).await?;
    let names = mechanism_names(&elytron::mechanism_configurations(&attributes));
    if names.is_empty() {
        return Err(SecurityError::precondition(format!(
            "No mechanism in Factory {name}"
        )));
    }
    Ok(names)
}

/// Stages `mechanism` on `factory`.
///
/// A mechanism of the same type is replaced in place unless it is already
/// identical, in which case nothing is staged.
///
/// ## Errors
///
/// Returns `SecurityError::Store` on transport errors.
pub async fn add_auth_mechanism(
    store: &dyn ResourceStore,
    factory: &AuthFactory,
    mechanism: &AuthMechanism,
) -> SecurityResult<Option<Operation>> {
    let current = client::read_resource(store, &factory.address())
        .await?
        .map(|attributes| elytron::mechanism_configurations(&attributes))
        .unwrap_or_default();

    Ok(merge_entry(
        current,
        attr::MECHANISM_NAME,
        &mechanism.mechanism_type,
        elytron::mechanism_entry(mechanism),
    )
    .map(|mechanisms| {
        Operation::write_attribute(
            factory.address(),
            attr::MECHANISM_CONFIGURATIONS,
            Value::Array(mechanisms),
        )
    }))
}

/// Stages `realm` on `domain`, making it the default realm unless it is
/// reached through a realm mapper.
///
/// ## Errors
///
/// Returns `SecurityError::Store` on transport errors.
pub async fn add_realm(
    store: &dyn ResourceStore,
    domain: &SecurityDomain,
    realm: &Realm,
) -> SecurityResult<Vec<Operation>> {
    let current = client::read_resource(store, &domain.address())
        .await?
        .and_then(|attributes| attributes.get(attr::REALMS).and_then(Value::as_array).cloned())
        .unwrap_or_default();

    let Some(realms) = merge_entry(current, attr::REALM, &realm.name, elytron::realm_entry(realm))
    else {
        return Ok(Vec::new());
    };
    let mut steps = vec![Operation::write_attribute(
        domain.address(),
        attr::REALMS,
        Value::Array(realms),
    )];
    if realm.config.realm_mapper().is_none() {
        steps.push(Operation::write_attribute(
            domain.address(),
            attr::DEFAULT_REALM,
            realm.name.as_str(),
        ));
    }
    Ok(steps)
}

/// The factory's mechanism list without `to_remove`.
///
/// ## Errors
///
/// Returns `SecurityError::Precondition` if the factory has no mechanisms
/// or lacks one of `to_remove`, and `SecurityError::Safety` if no
/// mechanism would remain.
pub fn remove_mechanisms(
    factory: &Map<String, Value>,
    factory_name: &str,
    spec: AuthFactorySpec,
    to_remove: &[String],
) -> SecurityResult<Operation> {
    let mechanisms = elytron::mechanism_configurations(factory);
    if mechanisms.is_empty() {
        return Err(SecurityError::precondition(format!(
            "No mechanism to remove in Factory {factory_name}"
        )));
    }

    let present = mechanism_names(&mechanisms);
    if let Some(missing) = to_remove.iter().find(|r| !present.contains(r)) {
        return Err(SecurityError::precondition(format!(
            "Mechanism {missing} is not contained in factory {factory_name}"
        )));
    }

    let remains: Vec<Value> = mechanisms
        .into_iter()
        .filter(|m| !to_remove.iter().any(|r| Some(r.as_str()) == entry_name(m, attr::MECHANISM_NAME)))
        .collect();
    if remains.is_empty() {
        return Err(SecurityError::safety(
            "Error: All mechanisms would be removed, this would fully disable access.",
        ));
    }

    Ok(Operation::write_attribute(
        AuthFactory::existing(factory_name, spec).address(),
        attr::MECHANISM_CONFIGURATIONS,
        Value::Array(remains),
    ))
}

/// Rewrites the mechanisms of a SASL factory in `order`.
///
/// ## Errors
///
/// Returns `SecurityError::Precondition` if the factory is missing, has no
/// mechanisms or lacks one of `order`, and `SecurityError::Safety` if
/// `order` is not a permutation of the current mechanisms.
pub async fn reorder_sasl_factory(
    store: &dyn ResourceStore,
    order: &[String],
    factory_name: &str,
) -> SecurityResult<Operation> {
    let attributes = read_factory(store, factory_name, AuthFactorySpec::Sasl).await?;
    let mechanisms = elytron::mechanism_configurations(&attributes);
    if mechanisms.is_empty() {
        return Err(SecurityError::precondition(format!(
            "No mechanism to re-order in Factory {factory_name}"
        )));
    }

    let present = mechanism_names(&mechanisms);
    if let Some(missing) = order.iter().find(|o| !present.contains(o)) {
        return Err(SecurityError::precondition(format!(
            "Mechanism {missing} is not contained in SASL factory {factory_name}"
        )));
    }
    if let Some((_, duplicate)) = order
        .iter()
        .enumerate()
        .find(|(i, o)| order[..*i].contains(o))
    {
        return Err(SecurityError::safety(format!(
            "Mechanism {duplicate} is listed more than once"
        )));
    }
    if present.iter().any(|p| !order.contains(p)) {
        return Err(SecurityError::safety(format!(
            "Mechanism list is not complete, existing mechanisms are:[{}]",
            present.join(", ")
        )));
    }

    let reordered: Vec<Value> = order
        .iter()
        .filter_map(|o| {
            mechanisms
                .iter()
                .find(|m| entry_name(m, attr::MECHANISM_NAME) == Some(o.as_str()))
                .cloned()
        })
        .collect();
    Ok(Operation::write_attribute(
        AuthFactory::existing(factory_name, AuthFactorySpec::Sasl).address(),
        attr::MECHANISM_CONFIGURATIONS,
        Value::Array(reordered),
    ))
}

async fn read_factory(
    store: &dyn ResourceStore,
    name: &str,
    spec: AuthFactorySpec,
) -> SecurityResult<Map<String, Value>> {
    client::read_resource(store, &AuthFactory::existing(name, spec).address())
        .await?
        .ok_or_else(|| SecurityError::precondition(format!("Invalid factory name {name}")))
}

fn entry_name<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry.get(key).and_then(Value::as_str)
}

fn mechanism_names(mechanisms: &[Value]) -> Vec<String> {
    mechanisms
        .iter()
        .filter_map(|m| entry_name(m, attr::MECHANISM_NAME))
        .map(str::to_string)
        .collect()
}

/// Puts `entry` into `list` in place of the element named `name`, or at the
/// end. `None` if an identical element is already there.
fn merge_entry(mut list: Vec<Value>, key: &str, name: &str, entry: Value) -> Option<Vec<Value>> {
    match list.iter().position(|e| entry_name(e, key) == Some(name)) {
        Some(index) if list[index] == entry => None,
        Some(index) => {
            list[index] = entry;
            Some(list)
        }
        None => {
            list.push(entry);
            Some(list)
        }
    }
}

/// Builds the resources exposing an authentication mechanism.
#[derive(Debug, Clone)]
pub struct AuthSecurityBuilder {
    mode: AuthMode,
    spec: AuthFactorySpec,
    realm_name: Option<String>,
    security_domain_name: Option<String>,
    auth_factory_name: Option<String>,
    active_factory: Option<String>,
    policy: MatchPolicy,
}

impl AuthSecurityBuilder {
    fn with_mode(mode: AuthMode, spec: AuthFactorySpec) -> Self {
        Self {
            mode,
            spec,
            realm_name: None,
            security_domain_name: None,
            auth_factory_name: None,
            active_factory: None,
            policy: MatchPolicy::default(),
        }
    }

    /// Exposes `mechanism` through a factory of `spec`.
    #[must_use]
    pub fn for_mechanism(mechanism: AuthMechanism, spec: AuthFactorySpec) -> Self {
        Self::with_mode(AuthMode::Mechanism(mechanism), spec)
    }

    /// Uses a factory shipped with the server.
    #[must_use]
    pub fn for_out_of_the_box(factory: AuthFactory) -> Self {
        let spec = factory.spec;
        Self::with_mode(AuthMode::OutOfTheBox(factory), spec)
    }

    /// Reorders the mechanisms of the active SASL factory.
    #[must_use]
    pub fn for_reorder(order: Vec<String>) -> Self {
        Self::with_mode(AuthMode::Reorder(order), AuthFactorySpec::Sasl)
    }

    /// Names the realm if one is created.
    #[must_use]
    pub fn realm_name(mut self, name: Option<String>) -> Self {
        self.realm_name = name;
        self
    }

    /// Names the security domain if one is created.
    #[must_use]
    pub fn security_domain_name(mut self, name: Option<String>) -> Self {
        self.security_domain_name = name;
        self
    }

    /// Names the factory if one is created.
    #[must_use]
    pub fn auth_factory_name(mut self, name: Option<String>) -> Self {
        self.auth_factory_name = name;
        self
    }

    /// The factory the endpoint uses today, if any.
    #[must_use]
    pub fn active_factory(mut self, name: Option<String>) -> Self {
        self.active_factory = name;
        self
    }

    /// Sets the matcher failure policy.
    #[must_use]
    pub const fn match_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether the endpoint already uses a factory.
    #[must_use]
    pub const fn is_factory_already_set(&self) -> bool {
        self.active_factory.is_some()
    }

    /// The factory kind being configured.
    #[must_use]
    pub const fn spec(&self) -> AuthFactorySpec {
        self.spec
    }

    /// Resolves the resources and stages what is missing.
    ///
    /// ## Errors
    ///
    /// Returns `SecurityError::Precondition` if the active factory is
    /// missing, the errors of [`reorder_sasl_factory`] in reorder mode, and
    /// store failures.
    pub async fn build(&self, store: &dyn ResourceStore) -> SecurityResult<AuthOutcome> {
        match &self.mode {
            AuthMode::OutOfTheBox(factory) => Ok(AuthOutcome {
                auth_factory: factory.clone(),
                plan: ReconciliationPlan::new(),
            }),
            AuthMode::Reorder(order) => {
                let Some(active) = &self.active_factory else {
                    return Err(SecurityError::precondition("No SASL factory to re-order"));
                };
                let step = reorder_sasl_factory(store, order, active).await?;
                let mut auth_factory = AuthFactory::existing(active.clone(), AuthFactorySpec::Sasl);
                auth_factory.mechanisms = step
                    .params
                    .get(attr::VALUE)
                    .and_then(Value::as_array)
                    .map(|entries| entries.iter().filter_map(elytron::parse_mechanism).collect())
                    .unwrap_or_default();

                let mut plan = ReconciliationPlan::new();
                plan.push(step);
                Ok(AuthOutcome { auth_factory, plan })
            }
            AuthMode::Mechanism(mechanism) => self.build_mechanism(store, mechanism).await,
        }
    }

    async fn build_mechanism(
        &self,
        store: &dyn ResourceStore,
        mechanism: &AuthMechanism,
    ) -> SecurityResult<AuthOutcome> {
        let matcher = ResourceMatcher::new(store).with_policy(self.policy);
        let mut plan = ReconciliationPlan::new();

        let lookup = self.lookup_realm(store, &matcher, &mechanism.config).await?;
        let (realm, config) = build_realm(&mechanism.config, lookup, self.realm_name.as_deref());
        plan.push_opt(realm_add_step(&realm));
        let mechanism = AuthMechanism {
            mechanism_type: mechanism.mechanism_type.clone(),
            config,
        };

        let factory = match &self.active_factory {
            None => match matcher.find_matching_auth_factory(&mechanism, self.spec).await? {
                Some(name) => get_auth_factory(store, &name, self.spec)
                    .await?
                    .unwrap_or_else(|| AuthFactory::existing(name, self.spec)),
                None => self.stage_factory(store, &mut plan, &mechanism, realm).await,
            },
            Some(active) => {
                let Some(factory) = get_auth_factory(store, active, self.spec).await? else {
                    return Err(SecurityError::precondition(format!(
                        "Invalid factory {active}"
                    )));
                };
                for step in add_realm(store, &factory.security_domain, &realm).await? {
                    plan.push(step);
                }
                factory
            }
        };

        plan.push_opt(add_auth_mechanism(store, &factory, &mechanism).await?);
        Ok(AuthOutcome {
            auth_factory: factory,
            plan,
        })
    }

    async fn lookup_realm(
        &self,
        store: &dyn ResourceStore,
        matcher: &ResourceMatcher<'_>,
        config: &MechanismConfig,
    ) -> SecurityResult<RealmLookup> {
        Ok(match config {
            MechanismConfig::Properties(properties) => RealmLookup {
                found: matcher
                    .find_matching(
                        ResourceType::PropertiesRealm,
                        &elytron::properties_realm_description(properties),
                    )
                    .await?,
                taken: client::security_resource_names(store, ResourceType::PropertiesRealm).await,
            },
            MechanismConfig::TrustStore(trust_store) => RealmLookup {
                found: matcher.find_key_store_realm(&trust_store.trust_store).await?,
                taken: Vec::new(),
            },
            _ => RealmLookup::default(),
        })
    }

    async fn stage_factory(
        &self,
        store: &dyn ResourceStore,
        plan: &mut ReconciliationPlan,
        mechanism: &AuthMechanism,
        realm: Realm,
    ) -> AuthFactory {
        let domain_name = match &self.security_domain_name {
            Some(name) => name.clone(),
            None => {
                let taken = client::security_resource_names(store, ResourceType::SecurityDomain).await;
                naming::unique_name(&naming::security_domain_name(&realm.name), &taken)
            }
        };
        let domain = SecurityDomain::with_realm(domain_name, realm);
        plan.push(elytron::add_security_domain(&domain));

        let factory_name = match &self.auth_factory_name {
            Some(name) => name.clone(),
            None => {
                let taken = client::security_resource_names(store, self.spec.resource_type()).await;
                naming::unique_name(&naming::auth_factory_name(mechanism, self.spec), &taken)
            }
        };
        let factory = AuthFactory::new(factory_name, domain, self.spec);
        plan.push(elytron::add_auth_factory(&factory));
        factory
    }
}
