//! Security report commands.

use ely_security::info::{self, HttpServerInfo, ManagementInfo};

use super::Session;
use crate::cli::SecurityCommand;
use crate::config::OutputFormat;
use crate::output::{output_json, print_auth, print_ssl};

/// Runs a report command.
pub async fn run_info(cmd: SecurityCommand, session: &Session) -> crate::CliResult<()> {
    match cmd {
        SecurityCommand::InfoManagement => {
            let report = info::management_info(session.store()).await?;
            match session.format() {
                OutputFormat::Table => print_management(&report),
                OutputFormat::Json => output_json(&report)?,
                OutputFormat::Quiet => {}
            }
            Ok(())
        }
        SecurityCommand::InfoHttpServer { server_name } => {
            let server = server_name.unwrap_or_else(|| session.defaults().server_name.clone());
            let report = info::http_server_info(session.store(), Some(server)).await?;
            match session.format() {
                OutputFormat::Table => print_http_server(&report),
                OutputFormat::Json => output_json(&report)?,
                OutputFormat::Quiet => {}
            }
            Ok(())
        }
        _ => Err(crate::CliError::InvalidArgument(
            "not a report command".to_string(),
        )),
    }
}

fn print_management(report: &ManagementInfo) {
    for interface in &report.interfaces {
        println!();
        println!("{}", interface.interface);
        println!();
        print_ssl(&interface.ssl);
        if let Some(http) = &interface.http {
            println!();
            print_auth(http);
        }
        println!();
        print_auth(&interface.sasl);
    }
    println!();
}

fn print_http_server(report: &HttpServerInfo) {
    println!();
    println!("HTTP Server: {}", report.server);
    println!();
    print_ssl(&report.ssl);
    println!();
    if report.application_security_domains.is_empty() {
        println!("No application security domains.");
    }
    for domain in &report.application_security_domains {
        println!("{}", domain.name);
        print_auth(&domain.http);
        println!();
    }
}
