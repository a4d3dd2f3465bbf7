//! # Ely CLI
//!
//! SSL and authentication setup for the application server.

#![forbid(unsafe_code)]

use clap::Parser;
use ely_cli::{
    cli::{Cli, Command},
    commands::{run_config, run_security, Session},
    config::CliConfig,
    output::error,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let mut config = match CliConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };

    let result = match &cli.command {
        Command::Config(cmd) => run_config(cmd.clone(), &mut config),
        Command::Security(cmd) => match Session::connect(&config, &cli) {
            Ok(session) => run_security(cmd.clone(), &session).await,
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        error(&e.to_string());
        std::process::exit(1);
    }
}
