//! Discovery of existing resources that satisfy a description.
//!
//! A candidate matches when every attribute of the canonical description
//! equals the candidate's value; attributes the description does not name
//! are ignored, attributes the candidate omits compare as null. Candidates
//! are tried in the store's enumeration order and the first match wins.

use ely_model::{attr, AuthFactorySpec, AuthMechanism, Operation, ResourceType};
use ely_store::ResourceStore;
use serde_json::{Map, Value};

use crate::elytron;
use crate::error::{SecurityError, SecurityResult};

/// What to do when candidates cannot be enumerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Report no match and let the caller create a new resource.
    #[default]
    FailOpen,
    /// Propagate the failure.
    FailClosed,
}

/// Whether `candidate` satisfies `canonical`.
#[must_use]
pub fn matches(canonical: &Map<String, Value>, candidate: &Map<String, Value>) -> bool {
    canonical
        .iter()
        .all(|(key, expected)| candidate.get(key).unwrap_or(&Value::Null) == expected)
}

/// Read-only lookups against the store.
pub struct ResourceMatcher<'a> {
    store: &'a dyn ResourceStore,
    policy: MatchPolicy,
}

impl<'a> ResourceMatcher<'a> {
    /// Creates a fail-open matcher.
    #[must_use]
    pub fn new(store: &'a dyn ResourceStore) -> Self {
        Self {
            store,
            policy: MatchPolicy::default(),
        }
    }

    /// Sets the failure policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// First resource of `resource_type` matching `canonical`.
    ///
    /// ## Errors
    ///
    /// Only with `MatchPolicy::FailClosed`, when the candidates cannot be
    /// read.
    pub async fn find_matching(
        &self,
        resource_type: ResourceType,
        canonical: &Map<String, Value>,
    ) -> SecurityResult<Option<String>> {
        Ok(self
            .find_all_matching(resource_type, canonical)
            .await?
            .into_iter()
            .next())
    }

    /// Every resource of `resource_type` matching `canonical`, in
    /// enumeration order.
    ///
    /// ## Errors
    ///
    /// Only with `MatchPolicy::FailClosed`, when the candidates cannot be
    /// read.
    pub async fn find_all_matching(
        &self,
        resource_type: ResourceType,
        canonical: &Map<String, Value>,
    ) -> SecurityResult<Vec<String>> {
        let found: Vec<String> = self
            .candidates(resource_type)
            .await?
            .into_iter()
            .filter(|(_, attributes)| matches(canonical, attributes))
            .map(|(name, _)| name)
            .collect();

        if let Some(first) = found.first() {
            tracing::debug!(%resource_type, name = %first, count = found.len(), "matched existing resource");
        } else {
            tracing::debug!(%resource_type, "no matching resource");
        }
        Ok(found)
    }

    /// A single-mechanism factory already exposing `mechanism` the same way.
    ///
    /// The realm mapper is compared when the mechanism has one, the realm
    /// name otherwise.
    ///
    /// ## Errors
    ///
    /// Only with `MatchPolicy::FailClosed`, when the factories cannot be
    /// read.
    pub async fn find_matching_auth_factory(
        &self,
        mechanism: &AuthMechanism,
        spec: AuthFactorySpec,
    ) -> SecurityResult<Option<String>> {
        let found = self
            .candidates(spec.resource_type())
            .await?
            .into_iter()
            .find(|(name, attributes)| {
                let factory = elytron::parse_auth_factory(name, spec, attributes);
                let [existing] = factory.mechanisms.as_slice() else {
                    return false;
                };
                if existing.mechanism_type != mechanism.mechanism_type {
                    return false;
                }
                match mechanism.config.realm_mapper() {
                    Some(mapper) => existing.config.realm_mapper() == Some(mapper),
                    None => existing.config.realm_name() == mechanism.config.realm_name(),
                }
            })
            .map(|(name, _)| name);

        if let Some(name) = &found {
            tracing::debug!(%name, mechanism = %mechanism.mechanism_type, "matched existing factory");
        }
        Ok(found)
    }

    /// First key-store realm over `trust_store`.
    ///
    /// ## Errors
    ///
    /// Only with `MatchPolicy::FailClosed`, when the realms cannot be read.
    pub async fn find_key_store_realm(&self, trust_store: &str) -> SecurityResult<Option<String>> {
        Ok(self
            .candidates(ResourceType::KeyStoreRealm)
            .await?
            .into_iter()
            .find(|(_, attributes)| {
                attributes.get(attr::KEY_STORE).and_then(Value::as_str) == Some(trust_store)
            })
            .map(|(name, _)| name))
    }

    async fn candidates(
        &self,
        resource_type: ResourceType,
    ) -> SecurityResult<Vec<(String, Map<String, Value>)>> {
        let operation = Operation::read_elytron_children(resource_type);
        let failure = match self.store.execute(&operation).await {
            Ok(response) if response.is_success() => {
                return Ok(match response.result {
                    Some(Value::Object(children)) => children
                        .into_iter()
                        .map(|(name, attributes)| match attributes {
                            Value::Object(map) => (name, map),
                            _ => (name, Map::new()),
                        })
                        .collect(),
                    _ => Vec::new(),
                });
            }
            Ok(response) => SecurityError::failed(response.failure_message()),
            Err(e) => SecurityError::from(e),
        };

        match self.policy {
            MatchPolicy::FailOpen => {
                tracing::warn!(%resource_type, error = %failure, "cannot enumerate resources, assuming no match");
                Ok(Vec::new())
            }
            MatchPolicy::FailClosed => Err(failure),
        }
    }
}
