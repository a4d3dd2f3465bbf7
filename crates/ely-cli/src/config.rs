//! CLI configuration.

use std::path::PathBuf;

use ely_security::naming;
use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Controller URL (e.g., http://localhost:9990).
    #[serde(default = "default_controller_url")]
    pub controller_url: String,

    /// Management user.
    pub username: Option<String>,

    /// Output format.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Defaults of the security commands.
    #[serde(default)]
    pub security: SecurityDefaults,
}

/// Default controller URL.
fn default_controller_url() -> String {
    "http://localhost:9990".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            controller_url: default_controller_url(),
            username: None,
            output_format: OutputFormat::default(),
            security: SecurityDefaults::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from file.
    pub fn load() -> crate::CliResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses a configuration file.
    pub fn parse(content: &str) -> crate::CliResult<Self> {
        toml::from_str(content)
            .map_err(|e| crate::CliError::Config(format!("failed to parse config: {e}")))
    }

    /// Saves configuration to file.
    pub fn save(&self) -> crate::CliResult<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::CliError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Gets the configuration file path.
    pub fn config_path() -> crate::CliResult<PathBuf> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| crate::CliError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".ely").join("ely.toml"))
    }

    /// Gets the effective controller URL (from args or config).
    #[must_use]
    pub fn effective_controller(&self, arg_controller: Option<&str>) -> String {
        arg_controller.map_or_else(|| self.controller_url.clone(), str::to_string)
    }
}

/// Defaults applied when an option is not given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityDefaults {
    /// Management interface of the management commands.
    pub management_interface: String,
    /// Undertow server of the HTTP server commands.
    pub server_name: String,
    /// Protocols of new SSL contexts, comma separated.
    pub protocols: Option<String>,
    /// Socket binding written on management interfaces without one.
    pub secure_socket_binding: String,
    /// `relative-to` of key store files given without one.
    pub default_key_store_relative_to: Option<String>,
}

impl Default for SecurityDefaults {
    fn default() -> Self {
        Self {
            management_interface: naming::DEFAULT_MANAGEMENT_INTERFACE.to_string(),
            server_name: naming::DEFAULT_SERVER_NAME.to_string(),
            protocols: None,
            secure_socket_binding: naming::DEFAULT_SECURE_SOCKET_BINDING.to_string(),
            default_key_store_relative_to: None,
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output, tables for lists.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// Quiet (errors only).
    Quiet,
}
