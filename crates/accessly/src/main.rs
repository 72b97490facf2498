mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use accessly_api::{AccessClient, TransportConfig};
use accessly_core::CoreError;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a controller connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "accessly", &mut std::io::stdout());
            Ok(())
        }

        // Door commands require a controller connection
        Command::Doors(args) => {
            let client = build_client(&cli.global)?;

            tracing::debug!(command = ?args.command, "dispatching command");
            commands::doors::handle(client, args, &cli.global).await
        }
    }
}

/// Build an `AccessClient` from the config file, profile, and CLI
/// overrides.
fn build_client(global: &cli::GlobalOpts) -> Result<AccessClient, CliError> {
    let connection = config::build_connection(global)?;

    let transport = TransportConfig {
        tls: connection.tls,
        timeout: connection.timeout,
    };

    AccessClient::from_token(connection.url.as_str(), &connection.token, &transport)
        .map_err(|e| CliError::from(CoreError::from(e)))
}
