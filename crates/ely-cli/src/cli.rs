//! CLI argument parsing.

use clap::{Args, Parser, Subcommand};
use ely_model::MechanismKind;

use crate::config::OutputFormat;

/// Ely - SSL and authentication setup for the application server.
#[derive(Debug, Parser)]
#[command(name = "ely")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Controller URL (overrides config).
    #[arg(short, long, env = "ELY_CONTROLLER")]
    pub controller: Option<String>,

    /// Management user (overrides config).
    #[arg(short, long, env = "ELY_USER")]
    pub user: Option<String>,

    /// Management password; prompted for when a user is set without one.
    #[arg(long, env = "ELY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Output format (overrides config).
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the composite request instead of executing it.
    #[arg(long, global = true)]
    pub print_request: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Security configuration commands.
    #[command(subcommand)]
    Security(SecurityCommand),

    /// Configuration management.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Security commands.
#[derive(Debug, Clone, Subcommand)]
pub enum SecurityCommand {
    /// Enable SSL for a management interface.
    EnableSslManagement {
        /// Management interface (default http-interface).
        #[arg(long)]
        management_interface: Option<String>,

        /// Socket binding written when the interface has no secure one.
        #[arg(long)]
        http_secure_socket_binding: Option<String>,

        #[command(flatten)]
        ssl: SslArgs,
    },

    /// Disable SSL for a management interface.
    DisableSslManagement {
        /// Management interface (default http-interface).
        #[arg(long)]
        management_interface: Option<String>,

        /// Don't reload the server.
        #[arg(long)]
        no_reload: bool,
    },

    /// Enable SSL for an undertow server.
    EnableSslHttpServer {
        /// Undertow server (default default-server).
        #[arg(long)]
        server_name: Option<String>,

        /// Keep the security realm of the HTTPS listener.
        #[arg(long)]
        no_override_security_realm: bool,

        #[command(flatten)]
        ssl: SslArgs,
    },

    /// Disable SSL for an undertow server.
    DisableSslHttpServer {
        /// Undertow server (default default-server).
        #[arg(long)]
        server_name: Option<String>,

        /// Don't reload the server.
        #[arg(long)]
        no_reload: bool,
    },

    /// Enable HTTP authentication for the management HTTP interface.
    EnableHttpAuthManagement {
        #[command(flatten)]
        mechanism: MechanismArgs,
    },

    /// Disable HTTP authentication, or some of its mechanisms, for the
    /// management HTTP interface.
    DisableHttpAuthManagement {
        #[command(flatten)]
        disable: DisableArgs,
    },

    /// Enable HTTP authentication for an application security domain.
    EnableHttpAuthHttpServer {
        /// Application security domain.
        #[arg(long)]
        security_domain: String,

        #[command(flatten)]
        mechanism: MechanismArgs,
    },

    /// Disable HTTP authentication, or some of its mechanisms, for an
    /// application security domain.
    DisableHttpAuthHttpServer {
        /// Application security domain.
        #[arg(long)]
        security_domain: String,

        #[command(flatten)]
        disable: DisableArgs,
    },

    /// Enable SASL authentication for a management interface.
    EnableSaslManagement {
        /// Management interface (default http-interface).
        #[arg(long)]
        management_interface: Option<String>,

        #[command(flatten)]
        mechanism: MechanismArgs,
    },

    /// Disable SASL authentication, or some of its mechanisms, for a
    /// management interface.
    DisableSaslManagement {
        /// Management interface (default http-interface).
        #[arg(long)]
        management_interface: Option<String>,

        #[command(flatten)]
        disable: DisableArgs,
    },

    /// Reorder the SASL mechanisms of a management interface.
    ReorderSaslManagement {
        /// Management interface (default http-interface).
        #[arg(long)]
        management_interface: Option<String>,

        /// New order, comma separated.
        #[arg(long, value_delimiter = ',', required = true)]
        mechanisms_order: Vec<String>,

        /// Don't reload the server.
        #[arg(long)]
        no_reload: bool,
    },

    /// Show the security of the management interfaces.
    InfoManagement,

    /// Show the security of an undertow server.
    InfoHttpServer {
        /// Undertow server (default default-server).
        #[arg(long)]
        server_name: Option<String>,
    },
}

/// Key store and SSL context options.
#[derive(Debug, Clone, Default, Args)]
pub struct SslArgs {
    /// Existing key store.
    #[arg(long)]
    pub key_store_name: Option<String>,

    /// Key store file.
    #[arg(long)]
    pub key_store_path: Option<String>,

    /// Path variable the key store file is relative to.
    #[arg(long, requires = "key_store_path")]
    pub key_store_path_relative_to: Option<String>,

    /// Key store password.
    #[arg(long, requires = "key_store_path")]
    pub key_store_password: Option<String>,

    /// Key store type, derived from the file extension when absent.
    #[arg(long, requires = "key_store_path")]
    pub key_store_type: Option<String>,

    /// Name of the key store to create for the file.
    #[arg(long, requires = "key_store_path")]
    pub new_key_store_name: Option<String>,

    /// Name of the key manager to create or reuse.
    #[arg(long)]
    pub new_key_manager_name: Option<String>,

    /// Name of the SSL context to create or reuse.
    #[arg(long)]
    pub new_ssl_context_name: Option<String>,

    /// Protocols of a new SSL context, comma separated.
    #[arg(long)]
    pub protocols: Option<String>,

    /// Generate a key pair, asking for its details.
    #[arg(long)]
    pub interactive: bool,

    /// Don't reload the server.
    #[arg(long)]
    pub no_reload: bool,
}

/// Authentication mechanism options.
#[derive(Debug, Clone, Default, Args)]
pub struct MechanismArgs {
    /// Mechanism to expose; the out-of-the-box factory is used when absent.
    #[arg(long)]
    pub mechanism: Option<MechanismKind>,

    /// Users properties file.
    #[arg(long)]
    pub user_properties_file: Option<String>,

    /// Groups properties file.
    #[arg(long, requires = "user_properties_file")]
    pub group_properties_file: Option<String>,

    /// Path variable the properties files are relative to.
    #[arg(long, requires = "user_properties_file")]
    pub relative_to: Option<String>,

    /// Realm name exposed by the properties realm.
    #[arg(long)]
    pub user_properties_realm_name: Option<String>,

    /// Existing filesystem realm.
    #[arg(long)]
    pub file_system_realm: Option<String>,

    /// Role decoder of the filesystem realm.
    #[arg(long, requires = "file_system_realm")]
    pub user_role_decoder: Option<String>,

    /// Trust store of certificate mechanisms.
    #[arg(long, visible_alias = "external-trust-store")]
    pub client_cert_trust_store: Option<String>,

    /// Grant the local user the super-user role.
    #[arg(long)]
    pub super_user: bool,

    /// Name of the realm to create.
    #[arg(long)]
    pub new_realm_name: Option<String>,

    /// Name of the security domain to create.
    #[arg(long)]
    pub new_security_domain_name: Option<String>,

    /// Name of the authentication factory to create.
    #[arg(long)]
    pub new_auth_factory_name: Option<String>,

    /// Don't reload the server.
    #[arg(long)]
    pub no_reload: bool,
}

/// Authentication disable options.
#[derive(Debug, Clone, Default, Args)]
pub struct DisableArgs {
    /// Mechanism to remove; the factory is unbound when absent.
    #[arg(long = "mechanism")]
    pub mechanisms: Vec<String>,

    /// Don't reload the server.
    #[arg(long)]
    pub no_reload: bool,
}

/// Configuration commands.
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },
}
