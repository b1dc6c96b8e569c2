use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use isochrone_overlap::api::AppState;
use isochrone_overlap::config::IsochroneConfig;
use isochrone_overlap::geoapify::GeoapifyClient;
use isochrone_overlap::session::IsochroneSession;
use isochrone_overlap::{logging, web};

/// Serve the area reachable from every given location within a travel time.
///
/// Configuration is read from the config file and `ISOCHRONE_*` environment
/// variables; the Geoapify key may also come from `GEOAPIFY_API_KEY`.
#[derive(Parser)]
#[command(name = "isochrone-overlap", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = IsochroneConfig::load_from_path(cli.config)?;
    logging::init(&config.logging)?;

    let client = Arc::new(
        GeoapifyClient::new(&config.geoapify)
            .context("Set geoapify.api_key in the config file or GEOAPIFY_API_KEY")?,
    );
    let session = IsochroneSession::from_clients(client.clone(), client);

    let state = Arc::new(AppState {
        session,
        defaults: config.defaults.clone(),
    });

    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);

    info!("Starting isochrone-overlap {}", isochrone_overlap::VERSION);

    web::run(state, &host, port).await
}
