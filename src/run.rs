use clap::Parser;
use dotenvy::dotenv;
use l402_reqwest::L402Client;

use crate::config::CliArgs;
use crate::telemetry::Telemetry;

/// Parses the command line, builds the client and runs the subcommand.
///
/// - Loads `.env` variables.
/// - Initializes logging and, if configured, OpenTelemetry export.
/// - Layers the configuration file under flags and environment.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env variables
    dotenv().ok();

    let _telemetry = Telemetry::new()
        .with_name(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .register();

    let args = CliArgs::parse();
    let config = args.client_config()?;
    let client = L402Client::new(&config)?;
    tracing::debug!(base_url = %client.transport().base_url(), "Client ready");

    args.command.run(&client).await?;
    Ok(())
}
