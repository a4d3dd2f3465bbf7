//! Where the key store of a new SSL context comes from.

use std::collections::VecDeque;

use ely_model::ResourceType;

use crate::elytron::{KeyStoreFile, JBOSS_SERVER_CONFIG_DIR, PLACEHOLDER};
use crate::error::{SecurityError, SecurityResult};
use crate::matcher::ResourceMatcher;

/// Line oriented operator interaction.
pub trait Prompter: Send {
    /// Prints a line.
    fn print_line(&mut self, line: &str);

    /// Reads a line after showing `prompt`; `None` at end of input.
    fn input_line(&mut self, prompt: &str) -> Option<String>;

    /// Reads a line without echoing it.
    fn input_secret(&mut self, prompt: &str) -> Option<String> {
        self.input_line(prompt)
    }
}

/// Prompter answering from a fixed list and recording what was shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    prompts: Vec<String>,
    lines: Vec<String>,
}

impl ScriptedPrompter {
    /// Creates a prompter giving `answers` in order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Prompts shown so far.
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Lines printed so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Prompter for ScriptedPrompter {
    fn print_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn input_line(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front()
    }
}

/// A key store given by file path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyStorePath {
    /// The file and how to open it.
    pub file: KeyStoreFile,
    /// Name of the key store if one has to be created.
    pub new_name: Option<String>,
}

/// A key store generated on the server from operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKeyStore {
    /// File name offered when the operator gives none.
    pub default_file: String,
    /// Whether the operator is asked. Otherwise every input is a
    /// placeholder and nothing is executed.
    pub interactive: bool,
}

/// Source of the key store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStoreSource {
    /// An existing key store.
    Named(String),
    /// A key store file, reused if a key store already points at it.
    Path(KeyStorePath),
    /// A new self-signed key pair.
    Generated(GeneratedKeyStore),
}

impl KeyStoreSource {
    /// Whether this source creates key material.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        matches!(self, Self::Generated(_))
    }
}

/// What the operator supplied for a generated key store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedInputs {
    /// Key store file name, in the server configuration directory.
    pub file: String,
    /// Key store password.
    pub password: String,
    /// Subject of the certificate.
    pub distinguished_name: String,
    /// Validity in days; `None` for the server default.
    pub validity: Option<String>,
    /// Alias of the key pair.
    pub alias: String,
}

impl GeneratedInputs {
    /// Inputs of a request that is only printed.
    #[must_use]
    pub fn placeholders() -> Self {
        Self {
            file: PLACEHOLDER.to_string(),
            password: PLACEHOLDER.to_string(),
            distinguished_name: PLACEHOLDER.to_string(),
            validity: Some(PLACEHOLDER.to_string()),
            alias: PLACEHOLDER.to_string(),
        }
    }

    /// Name of the exported certificate file.
    #[must_use]
    pub fn certificate_file(&self) -> String {
        format!("{}.pem", self.file)
    }
}

/// Asks the operator for the key pair details, then for confirmation.
///
/// ## Errors
///
/// Returns `SecurityError::Validation` if the chosen file is already used
/// by a key store, and `SecurityError::Aborted` if the operator declines
/// or input ends.
pub async fn prompt_generated_inputs(
    matcher: &ResourceMatcher<'_>,
    prompter: &mut dyn Prompter,
    default_file: &str,
) -> SecurityResult<GeneratedInputs> {
    prompter.print_line("Please provide required pieces of information to generate key pair.");

    let answer = ask(prompter, &format!("Key-store file name (default {default_file}): "))?;
    let file = if answer.is_empty() {
        default_file.to_string()
    } else {
        answer
    };
    let in_use = matcher
        .find_all_matching(
            ResourceType::KeyStore,
            &KeyStoreFile {
                relative_to: Some(JBOSS_SERVER_CONFIG_DIR.to_string()),
                ..KeyStoreFile::new(file.clone())
            }
            .description(),
        )
        .await?;
    if !in_use.is_empty() {
        return Err(SecurityError::validation(format!(
            "Error, the file {file} is already referenced from [{}] resources. Use --key-store-name option or choose another file name.",
            in_use.join(", ")
        )));
    }

    let password = ask_non_empty(prompter, "Password: ", true)?;
    let distinguished_name = ask_non_empty(prompter, "Distinguished Name: ", false)?;
    let validity = loop {
        let answer = ask(prompter, "Validity (in days, blank default): ")?;
        if answer.is_empty() {
            break None;
        }
        if answer.parse::<u64>().is_ok() {
            break Some(answer);
        }
        prompter.print_line(&format!("Invalid number {answer}"));
    };
    let alias = ask_non_empty(prompter, "Alias: ", false)?;

    let inputs = GeneratedInputs {
        file,
        password,
        distinguished_name,
        validity,
        alias,
    };
    confirm(prompter, &inputs)?;
    Ok(inputs)
}

fn confirm(prompter: &mut dyn Prompter, inputs: &GeneratedInputs) -> SecurityResult<()> {
    loop {
        prompter.print_line("");
        prompter.print_line("Key-store creation options:");
        prompter.print_line(&format!("key store file: {}", inputs.file));
        prompter.print_line(&format!("distinguished name: {}", inputs.distinguished_name));
        prompter.print_line(&format!("password: {}", "*".repeat(inputs.password.len())));
        prompter.print_line(&format!(
            "validity: {}",
            inputs.validity.as_deref().unwrap_or("default")
        ));
        prompter.print_line(&format!("alias: {}", inputs.alias));
        prompter.print_line(&format!(
            "Server keystore file {} and certificate file {} will be generated in server configuration directory.",
            inputs.file,
            inputs.certificate_file()
        ));
        match ask(prompter, "Do you confirm (y or n) :")?.as_str() {
            "y" => return Ok(()),
            "n" => return Err(SecurityError::Aborted),
            _ => {}
        }
    }
}

fn ask(prompter: &mut dyn Prompter, prompt: &str) -> SecurityResult<String> {
    prompter
        .input_line(prompt)
        .map(|s| s.trim().to_string())
        .ok_or(SecurityError::Aborted)
}

/// Secrets are kept as typed; other answers are trimmed.
fn ask_non_empty(prompter: &mut dyn Prompter, prompt: &str, secret: bool) -> SecurityResult<String> {
    loop {
        let answer = if secret {
            prompter.input_secret(prompt)
        } else {
            prompter.input_line(prompt).map(|s| s.trim().to_string())
        }
        .ok_or(SecurityError::Aborted)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
    }
}
