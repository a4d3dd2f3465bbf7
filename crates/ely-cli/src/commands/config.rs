//! Configuration management commands.

use crate::cli::ConfigCommand;
use crate::config::OutputFormat;
use crate::output::{info, success};
use crate::CliConfig;

/// Runs a config command.
pub fn run_config(cmd: ConfigCommand, config: &mut CliConfig) -> crate::CliResult<()> {
    match cmd {
        ConfigCommand::Show => show_config(config),
        ConfigCommand::Set { key, value } => {
            set_config(config, &key, &value)?;
            config.save()?;
            success(&format!("Set {key} = {value}"));
            Ok(())
        }
    }
}

/// Shows the current configuration.
fn show_config(config: &CliConfig) -> crate::CliResult<()> {
    let config_path = CliConfig::config_path()?;

    info(&format!("Configuration file: {}", config_path.display()));
    println!();
    println!("controller_url: {}", config.controller_url);

    if let Some(user) = &config.username {
        println!("username: {user}");
    }

    println!("output_format: {:?}", config.output_format);
    println!("management_interface: {}", config.security.management_interface);
    println!("server_name: {}", config.security.server_name);
    println!("secure_socket_binding: {}", config.security.secure_socket_binding);

    if let Some(protocols) = &config.security.protocols {
        println!("protocols: {protocols}");
    }
    if let Some(relative_to) = &config.security.default_key_store_relative_to {
        println!("default_key_store_relative_to: {relative_to}");
    }

    Ok(())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

/// Sets a configuration value.
fn set_config(config: &mut CliConfig, key: &str, value: &str) -> crate::CliResult<()> {
    match key {
        "controller_url" | "controller" => {
            config.controller_url = value.to_string();
        }
        "username" | "user" => {
            config.username = optional(value);
        }
        "output_format" | "output" => {
            config.output_format = match value.to_lowercase().as_str() {
                "table" => OutputFormat::Table,
                "json" => OutputFormat::Json,
                "quiet" => OutputFormat::Quiet,
                _ => {
                    return Err(crate::CliError::InvalidArgument(format!(
                        "Unknown output format: {value}. Supported: table, json, quiet"
                    )));
                }
            };
        }
        "management_interface" => {
            config.security.management_interface = value.to_string();
        }
        "server_name" => {
            config.security.server_name = value.to_string();
        }
        "secure_socket_binding" => {
            config.security.secure_socket_binding = value.to_string();
        }
        "protocols" => {
            config.security.protocols = optional(value);
        }
        "default_key_store_relative_to" => {
            config.security.default_key_store_relative_to = optional(value);
        }
        _ => {
            return Err(crate::CliError::InvalidArgument(format!(
                "Unknown configuration key: {key}. Known keys: controller_url, username, output_format, \
                 management_interface, server_name, secure_socket_binding, protocols, \
                 default_key_store_relative_to"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_known_keys() {
        let mut config = CliConfig::default();
        set_config(&mut config, "controller", "http://admin:9990").unwrap();
        set_config(&mut config, "output", "JSON").unwrap();
        set_config(&mut config, "protocols", "TLSv1.2,TLSv1.3").unwrap();
        set_config(&mut config, "username", "admin").unwrap();

        assert_eq!(config.controller_url, "http://admin:9990");
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.security.protocols.as_deref(), Some("TLSv1.2,TLSv1.3"));
        assert_eq!(config.username.as_deref(), Some("admin"));

        set_config(&mut config, "protocols", "none").unwrap();
        assert_eq!(config.security.protocols, None);
    }

    #[test]
    fn unknown_key_and_format_are_rejected() {
        let mut config = CliConfig::default();
        assert!(set_config(&mut config, "realm", "master").is_err());
        let err = set_config(&mut config, "output", "yaml").unwrap_err();
        assert!(err.to_string().contains("Unknown output format: yaml"));
        assert_eq!(config, CliConfig::default());
    }
}
