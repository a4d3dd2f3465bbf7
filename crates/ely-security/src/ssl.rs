//! Server SSL context construction.
//!
//! The builder walks key store, key manager and SSL context in turn. Each
//! is adopted when it already exists, matched against the store when its
//! dependency already existed, and otherwise staged for creation.

use ely_model::{Address, KeyManager, KeyStore, ResourceType, ServerSslContext};
use ely_store::ResourceStore;

use crate::client::{self, ReloadStatus};
use crate::elytron::{self, KeyStoreFile, JBOSS_SERVER_CONFIG_DIR};
use crate::error::{SecurityError, SecurityResult};
use crate::keystore::{self, GeneratedInputs, KeyStorePath, KeyStoreSource, Prompter};
use crate::matcher::{MatchPolicy, ResourceMatcher};
use crate::naming::{self, GeneratedNames};
use crate::plan::ReconciliationPlan;

/// Undoes what was executed outside the composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    /// Remove a key store created before the composite ran.
    RemoveKeyStore(String),
}

impl Compensation {
    /// Runs the compensating action.
    ///
    /// ## Errors
    ///
    /// Returns the failure of the compensating request.
    pub async fn run(&self, store: &dyn ResourceStore) -> SecurityResult<()> {
        match self {
            Self::RemoveKeyStore(name) => {
                tracing::warn!(key_store = %name, "removing generated key store");
                client::execute(store, &elytron::remove_key_store(name)).await?;
            }
        }
        Ok(())
    }
}

/// Runs `compensation` after `error` and returns the error to report.
///
/// A failing compensation is attached to `error` rather than replacing it.
pub async fn compensate(
    store: &dyn ResourceStore,
    error: SecurityError,
    compensation: Option<&Compensation>,
) -> SecurityError {
    let Some(compensation) = compensation else {
        return error;
    };
    match compensation.run(store).await {
        Ok(()) => error,
        Err(rollback) => {
            tracing::warn!(error = %rollback, "compensation failed");
            error.with_rollback_failure(rollback)
        }
    }
}

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct SslOutcome {
    /// The SSL context, key manager and key store to use.
    pub ssl_context: ServerSslContext,
    /// Steps still to execute.
    pub plan: ReconciliationPlan,
    /// Action undoing what the build already executed.
    pub compensation: Option<Compensation>,
}

impl SslOutcome {
    /// Executes the plan, compensating on failure, then reloads.
    ///
    /// ## Errors
    ///
    /// Returns the store's failure, with a failed compensation attached.
    pub async fn apply(&self, store: &dyn ResourceStore, no_reload: bool) -> SecurityResult<ReloadStatus> {
        if let Err(error) = client::execute_plan(store, &self.plan).await {
            return Err(compensate(store, error, self.compensation.as_ref()).await);
        }
        client::reload_server(store, no_reload).await
    }
}

enum SslStage {
    Start,
    KeyStoreResolved(KeyStore),
    KeyManagerResolved(KeyManager),
    SslContextResolved(ServerSslContext),
}

#[derive(Default)]
struct BuildState {
    plan: ReconciliationPlan,
    compensation: Option<Compensation>,
    generated: Option<GeneratedNames>,
}

/// Builds the chain key store, key manager, server SSL context.
#[derive(Debug, Clone)]
pub struct SslSecurityBuilder {
    source: KeyStoreSource,
    key_manager_name: Option<String>,
    ssl_context_name: Option<String>,
    protocols: Option<String>,
    policy: MatchPolicy,
}

impl SslSecurityBuilder {
    /// Creates a builder for `source`.
    #[must_use]
    pub fn new(source: KeyStoreSource) -> Self {
        Self {
            source,
            key_manager_name: None,
            ssl_context_name: None,
            protocols: None,
            policy: MatchPolicy::default(),
        }
    }

    /// Names the key manager if one is created.
    #[must_use]
    pub fn key_manager_name(mut self, name: Option<String>) -> Self {
        self.key_manager_name = name;
        self
    }

    /// Names the SSL context if one is created.
    #[must_use]
    pub fn ssl_context_name(mut self, name: Option<String>) -> Self {
        self.ssl_context_name = name;
        self
    }

    /// Comma separated protocols of the SSL context.
    #[must_use]
    pub fn protocols(mut self, protocols: Option<String>) -> Self {
        self.protocols = protocols;
        self
    }

    /// Sets the matcher failure policy.
    #[must_use]
    pub const fn match_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolves the chain and stages what is missing.
    ///
    /// An interactive generated key store is created immediately; if a
    /// later step of the build fails it is removed again.
    ///
    /// ## Errors
    ///
    /// Returns `SecurityError::Precondition` if a named key store is
    /// missing, `SecurityError::Aborted` if the operator declines, and
    /// store failures.
    pub async fn build(
        &self,
        store: &dyn ResourceStore,
        prompter: Option<&mut dyn Prompter>,
    ) -> SecurityResult<SslOutcome> {
        let matcher = ResourceMatcher::new(store).with_policy(self.policy);
        let mut state = BuildState::default();
        let mut prompter = prompter;

        let mut stage = SslStage::Start;
        loop {
            let next = match stage {
                SslStage::Start => self
                    .resolve_key_store(store, &matcher, &mut state, prompter.take())
                    .await
                    .map(SslStage::KeyStoreResolved),
                SslStage::KeyStoreResolved(key_store) => self
                    .resolve_key_manager(store, &matcher, &mut state, key_store)
                    .await
                    .map(SslStage::KeyManagerResolved),
                SslStage::KeyManagerResolved(key_manager) => self
                    .resolve_ssl_context(store, &matcher, &mut state, key_manager)
                    .await
                    .map(SslStage::SslContextResolved),
                SslStage::SslContextResolved(ssl_context) => {
                    return Ok(SslOutcome {
                        ssl_context,
                        plan: state.plan,
                        compensation: state.compensation,
                    });
                }
            };
            stage = match next {
                Ok(stage) => stage,
                Err(error) => return Err(compensate(store, error, state.compensation.as_ref()).await),
            };
        }
    }

    async fn resolve_key_store(
        &self,
        store: &dyn ResourceStore,
        matcher: &ResourceMatcher<'_>,
        state: &mut BuildState,
        prompter: Option<&mut dyn Prompter>,
    ) -> SecurityResult<KeyStore> {
        match &self.source {
            KeyStoreSource::Named(name) => named_key_store(store, name).await,
            KeyStoreSource::Path(path) => path_key_store(store, matcher, state, path).await,
            KeyStoreSource::Generated(generated) => {
                let inputs = match prompter {
                    Some(prompter) if generated.interactive => {
                        keystore::prompt_generated_inputs(matcher, prompter, &generated.default_file)
                            .await?
                    }
                    None if generated.interactive => {
                        return Err(SecurityError::validation(
                            "Generating a key store requires an interactive session",
                        ));
                    }
                    _ => GeneratedInputs::placeholders(),
                };
                generated_key_store(store, state, &inputs, generated.interactive).await
            }
        }
    }

    async fn resolve_key_manager(
        &self,
        store: &dyn ResourceStore,
        matcher: &ResourceMatcher<'_>,
        state: &mut BuildState,
        key_store: KeyStore,
    ) -> SecurityResult<KeyManager> {
        if let Some(name) = &self.key_manager_name {
            if client::security_resource_exists(store, ResourceType::KeyManager, name).await? {
                tracing::debug!(key_manager = %name, "adopting existing key manager");
                return Ok(KeyManager {
                    name: name.clone(),
                    key_store,
                    exists: true,
                });
            }
        }

        let mut key_manager = KeyManager {
            name: String::new(),
            key_store,
            exists: false,
        };
        if key_manager.key_store.exists {
            let canonical = elytron::key_manager_description(&key_manager);
            if let Some(name) = matcher
                .find_matching(ResourceType::KeyManager, &canonical)
                .await?
            {
                key_manager.name = name;
                key_manager.exists = true;
                return Ok(key_manager);
            }
        }

        key_manager.name = match (&self.key_manager_name, &state.generated) {
            (Some(name), _) => name.clone(),
            (None, Some(generated)) => generated.key_manager.clone(),
            (None, None) => {
                let taken = client::security_resource_names(store, ResourceType::KeyManager).await;
                naming::unique_name(&naming::key_manager_name(&key_manager.key_store.name), &taken)
            }
        };
        state.plan.push(elytron::add_key_manager(&key_manager));
        Ok(key_manager)
    }

    async fn resolve_ssl_context(
        &self,
        store: &dyn ResourceStore,
        matcher: &ResourceMatcher<'_>,
        state: &mut BuildState,
        key_manager: KeyManager,
    ) -> SecurityResult<ServerSslContext> {
        if let Some(name) = &self.ssl_context_name {
            if client::security_resource_exists(store, ResourceType::ServerSslContext, name).await? {
                tracing::debug!(ssl_context = %name, "adopting existing ssl context");
                return Ok(ServerSslContext {
                    name: name.clone(),
                    key_manager,
                    exists: true,
                });
            }
        }

        let protocols = self
            .protocols
            .as_deref()
            .map_or_else(naming::default_protocols, naming::split_protocols);

        if key_manager.exists {
            let canonical = elytron::ssl_context_description(&key_manager.name, &protocols);
            if let Some(name) = matcher
                .find_matching(ResourceType::ServerSslContext, &canonical)
                .await?
            {
                return Ok(ServerSslContext {
                    name,
                    key_manager,
                    exists: true,
                });
            }
        }

        let name = match (&self.ssl_context_name, &state.generated) {
            (Some(name), _) => name.clone(),
            (None, Some(generated)) => generated.ssl_context.clone(),
            (None, None) => {
                let taken =
                    client::security_resource_names(store, ResourceType::ServerSslContext).await;
                naming::unique_name(&naming::ssl_context_name(&key_manager.key_store.name), &taken)
            }
        };
        state
            .plan
            .push(elytron::add_ssl_context(&name, &key_manager.name, &protocols));
        Ok(ServerSslContext {
            name,
            key_manager,
            exists: false,
        })
    }
}

async fn named_key_store(store: &dyn ResourceStore, name: &str) -> SecurityResult<KeyStore> {
    let address = Address::elytron_resource(ResourceType::KeyStore, name);
    let Some(attributes) = client::read_resource(store, &address).await? else {
        return Err(SecurityError::precondition(format!(
            "Key-store {name} doesn't exist"
        )));
    };
    let Some(password) = elytron::credential_password(&attributes) else {
        return Err(SecurityError::precondition(format!(
            "Key-store {name} has no clear-text credential, can't create a key-manager for it"
        )));
    };
    Ok(KeyStore::new(name, Some(password), true))
}

async fn path_key_store(
    store: &dyn ResourceStore,
    matcher: &ResourceMatcher<'_>,
    state: &mut BuildState,
    path: &KeyStorePath,
) -> SecurityResult<KeyStore> {
    let mut file = path.file.clone();
    if file.key_store_type.is_none() {
        file.key_store_type = Some(naming::key_store_type(&file.path).to_string());
    }

    if let Some(name) = matcher
        .find_matching(ResourceType::KeyStore, &file.description())
        .await?
    {
        return Ok(KeyStore::new(name, file.password, true));
    }

    let name = match &path.new_name {
        Some(name) => name.clone(),
        None => {
            let taken = client::security_resource_names(store, ResourceType::KeyStore).await;
            naming::unique_name(&naming::key_store_name(&file.path), &taken)
        }
    };
    state.plan.push(elytron::add_key_store(&name, &file));
    Ok(KeyStore::new(name, file.password, false))
}

async fn generated_key_store(
    store: &dyn ResourceStore,
    state: &mut BuildState,
    inputs: &GeneratedInputs,
    interactive: bool,
) -> SecurityResult<KeyStore> {
    let names = naming::generated_names(&uuid::Uuid::new_v4().to_string());
    let file = KeyStoreFile {
        relative_to: Some(JBOSS_SERVER_CONFIG_DIR.to_string()),
        password: Some(inputs.password.clone()),
        key_store_type: Some(naming::key_store_type(&inputs.file).to_string()),
        required: Some(false),
        ..KeyStoreFile::new(inputs.file.clone())
    };
    let add = elytron::add_key_store(&names.key_store, &file);

    // Key pair operations need the key store to exist before the composite.
    if interactive {
        client::execute(store, &add).await?;
        state.compensation = Some(Compensation::RemoveKeyStore(names.key_store.clone()));
    } else {
        state.plan.push(add);
    }
    state.plan.push(elytron::generate_key_pair(
        &names.key_store,
        &inputs.distinguished_name,
        &inputs.alias,
        inputs.validity.as_deref(),
    ));
    state.plan.push(elytron::store_key_store(&names.key_store));
    state.plan.push(elytron::export_certificate(
        &names.key_store,
        &inputs.certificate_file(),
        &inputs.alias,
    ));

    let key_store =
        KeyStore::new(names.key_store.clone(), Some(inputs.password.clone()), false)
            .with_alias(inputs.alias.clone());
    state.generated = Some(names);
    Ok(key_store)
}
