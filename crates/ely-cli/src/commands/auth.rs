//! Authentication commands.

use ely_model::MechanismKind;
use ely_security::{naming, service, AuthEndpoint, MatchPolicy, MechanismOptions, NewResourceNames};

use super::Session;
use crate::cli::{DisableArgs, MechanismArgs, SecurityCommand};

/// Runs an authentication command.
pub async fn run_auth(cmd: SecurityCommand, session: &Session) -> crate::CliResult<()> {
    let interface = |name: Option<String>| {
        name.unwrap_or_else(|| session.defaults().management_interface.clone())
    };
    match cmd {
        SecurityCommand::EnableHttpAuthManagement { mechanism } => {
            let endpoint = AuthEndpoint::ManagementHttp(naming::DEFAULT_MANAGEMENT_INTERFACE.to_string());
            enable_auth(session, &endpoint, mechanism).await
        }
        SecurityCommand::EnableHttpAuthHttpServer {
            security_domain,
            mechanism,
        } => enable_auth(session, &AuthEndpoint::Application(security_domain), mechanism).await,
        SecurityCommand::EnableSaslManagement {
            management_interface,
            mechanism,
        } => {
            let endpoint = AuthEndpoint::ManagementSasl(interface(management_interface));
            enable_auth(session, &endpoint, mechanism).await
        }
        SecurityCommand::DisableHttpAuthManagement { disable } => {
            let endpoint = AuthEndpoint::ManagementHttp(naming::DEFAULT_MANAGEMENT_INTERFACE.to_string());
            disable_auth(session, &endpoint, disable).await
        }
        SecurityCommand::DisableHttpAuthHttpServer {
            security_domain,
            disable,
        } => disable_auth(session, &AuthEndpoint::Application(security_domain), disable).await,
        SecurityCommand::DisableSaslManagement {
            management_interface,
            disable,
        } => {
            let endpoint = AuthEndpoint::ManagementSasl(interface(management_interface));
            disable_auth(session, &endpoint, disable).await
        }
        SecurityCommand::ReorderSaslManagement {
            management_interface,
            mechanisms_order,
            no_reload,
        } => reorder_sasl(session, &interface(management_interface), mechanisms_order, no_reload).await,
        _ => Err(crate::CliError::InvalidArgument(
            "not an authentication command".to_string(),
        )),
    }
}

fn mechanism_options(kind: MechanismKind, args: &MechanismArgs) -> MechanismOptions {
    MechanismOptions {
        user_properties_file: args.user_properties_file.clone(),
        group_properties_file: args.group_properties_file.clone(),
        relative_to: args.relative_to.clone(),
        user_properties_realm_name: args.user_properties_realm_name.clone(),
        file_system_realm: args.file_system_realm.clone(),
        user_role_decoder: args.user_role_decoder.clone(),
        trust_store: args.client_cert_trust_store.clone(),
        super_user: args.super_user,
        ..MechanismOptions::new(kind)
    }
}

async fn enable_auth(session: &Session, endpoint: &AuthEndpoint, args: MechanismArgs) -> crate::CliResult<()> {
    let spec = endpoint.spec();
    let mechanism = match args.mechanism {
        Some(kind) => {
            Some(service::build_mechanism(session.store(), spec, &mechanism_options(kind, &args)).await?)
        }
        None => None,
    };
    let names = NewResourceNames {
        realm: args.new_realm_name,
        security_domain: args.new_security_domain_name,
        auth_factory: args.new_auth_factory_name,
    };

    let outcome =
        service::plan_enable_auth(session.store(), endpoint, mechanism, names, MatchPolicy::FailOpen).await?;
    if outcome.plan.is_empty() {
        session.info(&format!("Authentication is already enabled for {}", endpoint.label()));
        return Ok(());
    }

    let Some(status) = session.apply(&outcome.plan, args.no_reload).await? else {
        return Ok(());
    };
    let factory = &outcome.auth_factory;
    session.success(&format!("Authentication configured for {}", endpoint.label()));
    session.info(&format!("{} authentication-factory={}", spec.display_name(), factory.name));
    if !factory.security_domain.name.is_empty() {
        session.info(&format!("security-domain={}", factory.security_domain.name));
    }
    session.report_reload(status);
    Ok(())
}

async fn disable_auth(session: &Session, endpoint: &AuthEndpoint, args: DisableArgs) -> crate::CliResult<()> {
    let spec = endpoint.spec();
    let plan = service::plan_disable_auth(session.store(), endpoint, &args.mechanisms).await?;
    let Some(status) = session.apply(&plan, args.no_reload).await? else {
        return Ok(());
    };
    if args.mechanisms.is_empty() {
        session.success(&format!(
            "{} authentication disabled for {}",
            spec.display_name(),
            endpoint.label()
        ));
    } else {
        session.success(&format!(
            "Mechanism removed from {} for {}",
            spec.display_name(),
            endpoint.label()
        ));
    }
    session.report_reload(status);
    Ok(())
}

async fn reorder_sasl(
    session: &Session,
    interface: &str,
    order: Vec<String>,
    no_reload: bool,
) -> crate::CliResult<()> {
    let outcome = service::plan_reorder_sasl(session.store(), interface, order).await?;
    let Some(status) = session.apply(&outcome.plan, no_reload).await? else {
        return Ok(());
    };
    session.success(&format!(
        "SASL mechanisms of {} reordered: {}",
        outcome.auth_factory.name,
        outcome.auth_factory.mechanism_names().join(", ")
    ));
    session.report_reload(status);
    Ok(())
}
