//! Command implementations.

pub mod auth;
pub mod config;
pub mod info;
pub mod ssl;

pub use auth::run_auth;
pub use config::run_config;
pub use info::run_info;
pub use ssl::run_ssl;

use std::sync::Arc;

use ely_model::Operation;
use ely_security::{client, ReconciliationPlan, ReloadStatus};
use ely_store::{HttpStore, HttpStoreConfig, ResourceStore};

use crate::cli::{Cli, SecurityCommand};
use crate::config::{OutputFormat, SecurityDefaults};
use crate::output::{self, info, success, warning};
use crate::CliConfig;

/// Runs a security command.
pub async fn run_security(cmd: SecurityCommand, session: &Session) -> crate::CliResult<()> {
    match cmd {
        cmd @ (SecurityCommand::EnableSslManagement { .. }
        | SecurityCommand::DisableSslManagement { .. }
        | SecurityCommand::EnableSslHttpServer { .. }
        | SecurityCommand::DisableSslHttpServer { .. }) => run_ssl(cmd, session).await,
        cmd @ (SecurityCommand::InfoManagement | SecurityCommand::InfoHttpServer { .. }) => {
            run_info(cmd, session).await
        }
        cmd => run_auth(cmd, session).await,
    }
}

/// Everything a security command needs: the store, the output settings and
/// the configured defaults.
pub struct Session {
    store: Arc<dyn ResourceStore>,
    format: OutputFormat,
    print_request: bool,
    defaults: SecurityDefaults,
}

impl Session {
    /// Connects to the controller named by the flags or the config.
    ///
    /// The password is prompted for when a user is given without one.
    pub fn connect(config: &CliConfig, cli: &Cli) -> crate::CliResult<Self> {
        let url = config.effective_controller(cli.controller.as_deref());
        let mut store_config = HttpStoreConfig::new(url);
        if let Some(user) = cli.user.as_ref().or(config.username.as_ref()) {
            let password = match &cli.password {
                Some(password) => password.clone(),
                None => output::prompt_password(&format!("Password for {user}: "))?,
            };
            store_config = store_config.with_credentials(user.clone(), Some(password));
        }
        let store = HttpStore::new(store_config)?;
        tracing::debug!(controller = %store.endpoint(), "connected");

        Ok(Self::new(
            Arc::new(store),
            cli.output.unwrap_or(config.output_format),
            cli.print_request,
            config.security.clone(),
        ))
    }

    /// Creates a session over `store`.
    #[must_use]
    pub fn new(
        store: Arc<dyn ResourceStore>,
        format: OutputFormat,
        print_request: bool,
        defaults: SecurityDefaults,
    ) -> Self {
        Self {
            store,
            format,
            print_request,
            defaults,
        }
    }

    /// The resource store.
    #[must_use]
    pub fn store(&self) -> &dyn ResourceStore {
        self.store.as_ref()
    }

    /// Output format.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Whether requests are printed instead of executed.
    #[must_use]
    pub const fn print_request(&self) -> bool {
        self.print_request
    }

    /// Configured defaults.
    #[must_use]
    pub const fn defaults(&self) -> &SecurityDefaults {
        &self.defaults
    }

    /// Prints a success message unless output is quiet.
    pub fn success(&self, message: &str) {
        if self.format != OutputFormat::Quiet {
            success(message);
        }
    }

    /// Prints an info message unless output is quiet.
    pub fn info(&self, message: &str) {
        if self.format != OutputFormat::Quiet {
            info(message);
        }
    }

    /// Prints the composite of `plan`.
    pub fn print_plan(&self, plan: &ReconciliationPlan) -> crate::CliResult<()> {
        print_operation(&plan.to_composite())
    }

    /// Applies `plan` and reloads, or prints it on a dry run.
    ///
    /// Returns `None` on a dry run.
    pub async fn apply(
        &self,
        plan: &ReconciliationPlan,
        no_reload: bool,
    ) -> crate::CliResult<Option<ReloadStatus>> {
        if self.print_request {
            self.print_plan(plan)?;
            return Ok(None);
        }
        Ok(Some(client::apply_plan(self.store(), plan, no_reload).await?))
    }

    /// Reports what happened to the server after a change.
    pub fn report_reload(&self, status: ReloadStatus) {
        match status {
            ReloadStatus::Reloaded => self.success("Server reloaded."),
            ReloadStatus::Skipped => {
                warning("Warning: server has not been reloaded. Call 'reload' to apply changes.");
            }
            ReloadStatus::NotNeeded => {}
        }
    }
}

fn print_operation(operation: &Operation) -> crate::CliResult<()> {
    output::output_json(operation)
}


#[cfg(test)]
mod tests {
    use ely_model::{Address, Operation};

    use super::testing::session_with;
    use super::*;

    fn http_interface() -> Address {
        Address::root()
            .child("core-service", "management")
            .child("management-interface", "http-interface")
    }

    fn plan() -> ReconciliationPlan {
        let mut plan = ReconciliationPlan::new();
        plan.push(Operation::write_attribute(http_interface(), "ssl-context", "ctx"));
        plan
    }

    #[tokio::test]
    async fn dry_run_does_not_touch_the_store() {
        let (store, session) = session_with(true);
        let status = session.apply(&plan(), false).await.unwrap();
        assert_eq!(status, None);
        assert!(store.executed_writes().is_empty());
        assert_eq!(store.reload_count(), 0);
    }

    #[tokio::test]
    async fn apply_reloads_unless_asked_not_to() {
        let (store, session) = session_with(false);
        store.insert(http_interface(), serde_json::json!({}));

        let status = session.apply(&plan(), true).await.unwrap();
        assert_eq!(status, Some(ReloadStatus::Skipped));
        assert_eq!(store.reload_count(), 0);

        let status = session.apply(&plan(), false).await.unwrap();
        assert_eq!(status, Some(ReloadStatus::Reloaded));
        assert_eq!(store.reload_count(), 1);
    }

    #[tokio::test]
    async fn empty_plan_needs_no_reload() {
        let (store, session) = session_with(false);
        let status = session.apply(&ReconciliationPlan::new(), false).await.unwrap();
        assert_eq!(status, Some(ReloadStatus::NotNeeded));
        assert_eq!(store.reload_count(), 0);
    }
}
