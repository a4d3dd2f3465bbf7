//! Output formatting utilities.

use std::io::{BufRead, Write};

use colored::Colorize;
use ely_security::info::{AuthInfo, MechanismInfo, SslInfo};
use ely_security::Prompter;
use tabled::{settings::Style, Table, Tabled};

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Prints a value as pretty JSON.
pub fn output_json<T: serde::Serialize + ?Sized>(value: &T) -> crate::CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// One row of a mechanism table.
#[derive(Debug, Clone, Tabled)]
pub struct MechanismRow {
    /// Mechanism name.
    #[tabled(rename = "Mechanism")]
    pub mechanism: String,
    /// Realm mapper.
    #[tabled(rename = "Realm mapper")]
    pub realm_mapper: String,
    /// Realm name.
    #[tabled(rename = "Realm name")]
    pub realm_name: String,
}

impl From<&MechanismInfo> for MechanismRow {
    fn from(info: &MechanismInfo) -> Self {
        Self {
            mechanism: info.mechanism.clone(),
            realm_mapper: info.realm_mapper.clone().unwrap_or_default(),
            realm_name: info.realm_name.clone().unwrap_or_default(),
        }
    }
}

/// Renders mechanisms as a table.
#[must_use]
pub fn mechanism_table(mechanisms: &[MechanismInfo]) -> String {
    let rows: Vec<MechanismRow> = mechanisms.iter().map(MechanismRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Prints the SSL section of a report.
pub fn print_ssl(ssl: &SslInfo) {
    for line in ssl.lines() {
        println!("{line}");
    }
}

/// Prints the authentication section of a report, mechanisms as a table.
pub fn print_auth(auth: &AuthInfo) {
    println!(
        "{} authentication enabled: {}",
        auth.spec.display_name(),
        auth.enabled
    );
    let Some(factory) = &auth.factory else {
        return;
    };
    println!("Authentication Factory: {factory}");
    println!(
        "Security Domain: {}",
        auth.security_domain.as_deref().unwrap_or_default()
    );
    if auth.mechanisms.is_empty() {
        println!("No mechanisms.");
    } else {
        println!("{}", mechanism_table(&auth.mechanisms));
    }
}

/// Prompts for a password without echo.
pub fn prompt_password(prompt: &str) -> crate::CliResult<String> {
    Ok(rpassword::prompt_password(prompt)?)
}

/// Prompter reading the terminal.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn print_line(&mut self, line: &str) {
        println!("{line}");
    }

    fn input_line(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        let _ = std::io::stdout().flush();

        let mut input = String::new();
        match std::io::stdin().lock().read_line(&mut input) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(input.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    fn input_secret(&mut self, prompt: &str) -> Option<String> {
        rpassword::prompt_password(prompt).ok()
    }
}
