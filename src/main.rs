//! Wialon gateway diagnostic CLI
//!
//! Exercises every gateway operation against the configured upstream
//! account and prints the normalized result as JSON. The HTTP surface of
//! the product lives elsewhere; this binary exists for operations and
//! integration debugging.

use clap::{Parser, Subcommand};
use serde_json::to_string_pretty;
use std::sync::Arc;
use tracing::error;
use wialon_gateway::{
    logging, FleetService, GatewayConfig, HttpTransport, Result, SessionClient,
};

/// Command line arguments
#[derive(Parser)]
#[command(name = "wialon-gateway")]
#[command(about = "Normalized view over a Wialon fleet account")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all units with normalized telemetry
    Units,
    /// Show full detail for one unit
    Unit {
        /// Unit id
        id: u64,
    },
    /// Dump the raw vendor record for one unit
    Raw {
        /// Unit id
        id: u64,
    },
    /// List engine/ignition sensors across the fleet
    Ignition,
    /// Print the data-flag and field-code reference
    Flags,
}

#[tokio::main]
async fn main() {
    logging::init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = GatewayConfig::from_env()?;
    let transport = Arc::new(HttpTransport::new(&config.wialon)?);
    let client = Arc::new(SessionClient::new(config.wialon.token.clone(), transport));
    let fleet = FleetService::new(client);

    let output = match cli.command {
        Commands::Units => to_string_pretty(&fleet.list_units().await?)?,
        Commands::Unit { id } => to_string_pretty(&fleet.unit_detail(id).await?)?,
        Commands::Raw { id } => to_string_pretty(&fleet.unit_raw(id).await?)?,
        Commands::Ignition => to_string_pretty(&fleet.ignition_sensors().await?)?,
        Commands::Flags => to_string_pretty(&fleet.flags_info())?,
    };

    println!("{output}");
    Ok(())
}
