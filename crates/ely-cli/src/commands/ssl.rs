//! SSL commands.

use ely_security::elytron::KeyStoreFile;
use ely_security::{
    service, GeneratedKeyStore, KeyStorePath, KeyStoreSource, Prompter, SecurityError, SslBindingOptions,
    SslEndpoint, SslSecurityBuilder,
};

use super::Session;
use crate::cli::{SecurityCommand, SslArgs};
use crate::config::SecurityDefaults;
use crate::output::StdinPrompter;

/// Runs an SSL command.
pub async fn run_ssl(cmd: SecurityCommand, session: &Session) -> crate::CliResult<()> {
    let defaults = session.defaults();
    match cmd {
        SecurityCommand::EnableSslManagement {
            management_interface,
            http_secure_socket_binding,
            ssl,
        } => {
            let endpoint = SslEndpoint::Management(
                management_interface.unwrap_or_else(|| defaults.management_interface.clone()),
            );
            let binding = SslBindingOptions {
                secure_socket_binding: http_secure_socket_binding
                    .unwrap_or_else(|| defaults.secure_socket_binding.clone()),
                override_security_realm: true,
            };
            enable_ssl(session, &endpoint, ssl, &binding).await
        }
        SecurityCommand::EnableSslHttpServer {
            server_name,
            no_override_security_realm,
            ssl,
        } => {
            let endpoint =
                SslEndpoint::HttpServer(server_name.unwrap_or_else(|| defaults.server_name.clone()));
            let binding = SslBindingOptions {
                secure_socket_binding: defaults.secure_socket_binding.clone(),
                override_security_realm: !no_override_security_realm,
            };
            enable_ssl(session, &endpoint, ssl, &binding).await
        }
        SecurityCommand::DisableSslManagement {
            management_interface,
            no_reload,
        } => {
            let endpoint = SslEndpoint::Management(
                management_interface.unwrap_or_else(|| defaults.management_interface.clone()),
            );
            disable_ssl(session, &endpoint, no_reload).await
        }
        SecurityCommand::DisableSslHttpServer {
            server_name,
            no_reload,
        } => {
            let endpoint =
                SslEndpoint::HttpServer(server_name.unwrap_or_else(|| defaults.server_name.clone()));
            disable_ssl(session, &endpoint, no_reload).await
        }
        _ => Err(crate::CliError::InvalidArgument(
            "not an SSL command".to_string(),
        )),
    }
}

async fn enable_ssl(
    session: &Session,
    endpoint: &SslEndpoint,
    args: SslArgs,
    binding: &SslBindingOptions,
) -> crate::CliResult<()> {
    let source = key_store_source(&args, endpoint, session.defaults(), session.print_request())?;
    let mut prompter = StdinPrompter;
    let prompter: Option<&mut dyn Prompter> = match &source {
        KeyStoreSource::Generated(generated) if generated.interactive => Some(&mut prompter),
        _ => None,
    };

    let builder = SslSecurityBuilder::new(source)
        .key_manager_name(args.new_key_manager_name)
        .ssl_context_name(args.new_ssl_context_name)
        .protocols(args.protocols.or_else(|| session.defaults().protocols.clone()));
    let outcome =
        service::plan_enable_ssl(session.store(), endpoint, &builder, binding, prompter).await?;

    if session.print_request() {
        return session.print_plan(&outcome.plan);
    }

    let status = outcome.apply(session.store(), args.no_reload).await?;
    let (ssl_context, key_manager, key_store) = outcome.ssl_context.names();
    session.success(&format!("SSL enabled for {}", endpoint.label()));
    session.info(&format!("ssl-context is {ssl_context}"));
    session.info(&format!("key-manager is {key_manager}"));
    session.info(&format!("key-store   is {key_store}"));
    session.report_reload(status);
    Ok(())
}

async fn disable_ssl(session: &Session, endpoint: &SslEndpoint, no_reload: bool) -> crate::CliResult<()> {
    let plan = service::plan_disable_ssl(session.store(), endpoint).await?;
    if let Some(status) = session.apply(&plan, no_reload).await? {
        session.success(&format!("SSL disabled for {}", endpoint.label()));
        session.report_reload(status);
    }
    Ok(())
}

/// Picks the key store source from the options.
///
/// Without a key store option a key pair is generated, asking the operator
/// unless the request is only printed.
fn key_store_source(
    args: &SslArgs,
    endpoint: &SslEndpoint,
    defaults: &SecurityDefaults,
    print_request: bool,
) -> crate::CliResult<KeyStoreSource> {
    match (&args.key_store_name, &args.key_store_path) {
        (Some(_), Some(_)) => Err(SecurityError::validation(
            "--key-store-name or --key-store-path can't both be set",
        )
        .into()),
        (Some(name), None) => Ok(KeyStoreSource::Named(name.clone())),
        (None, Some(path)) => {
            if args.key_store_password.is_none() {
                return Err(SecurityError::validation(
                    "--key-store-password must be set when using --key-store-path",
                )
                .into());
            }
            Ok(KeyStoreSource::Path(KeyStorePath {
                file: KeyStoreFile {
                    relative_to: args
                        .key_store_path_relative_to
                        .clone()
                        .or_else(|| defaults.default_key_store_relative_to.clone()),
                    password: args.key_store_password.clone(),
                    key_store_type: args.key_store_type.clone(),
                    ..KeyStoreFile::new(path.clone())
                },
                new_name: args.new_key_store_name.clone(),
            }))
        }
        (None, None) if print_request || args.interactive => {
            Ok(KeyStoreSource::Generated(GeneratedKeyStore {
                default_file: endpoint.default_key_store_file().to_string(),
                interactive: !print_request,
            }))
        }
        (None, None) => Err(SecurityError::validation(
            "No key store given: use --key-store-name or --key-store-path, \
             or --interactive to generate a key pair",
        )
        .into()),
    }
}
