//! `apirouter` command-line entry point.
//!
//! - `serve` runs the sample API from [`apirouter::demo`]
//! - `routes` prints the resolved route table

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use apirouter::config::{self, AppConfig, Registry};
use apirouter::lifecycle::{signals, Shutdown};
use apirouter::observability::{logging, metrics};
use apirouter::{demo, HttpServer};

#[derive(Parser)]
#[command(name = "apirouter")]
#[command(about = "Route table and sample server", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the sample API
    Serve,
    /// Print every resolved route
    Routes,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability.log_level)?;
    config::install_defaults(Registry::new().resolve(&config.apirouter)?);

    let urls = demo::app()?.urls();

    match cli.command {
        Commands::Routes => {
            for route in urls.resolve() {
                let allowed = route.dispatcher.allowed_methods();
                let methods: Vec<&str> = allowed.iter().map(|m| m.as_str()).collect();
                println!(
                    "{:<24} {:<48} {}",
                    route.path,
                    methods.join(", "),
                    route.name.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::Serve => {
            tracing::info!(
                bind_address = %config.server.bind_address,
                request_timeout_secs = config.server.request_timeout_secs,
                max_body_bytes = config.server.max_body_bytes,
                "Configuration loaded"
            );

            if config.observability.metrics_enabled {
                metrics::init_metrics(config.observability.metrics_address.parse()?)?;
            }

            let listener = TcpListener::bind(&config.server.bind_address).await?;
            let shutdown = Shutdown::new();
            signals::spawn_ctrl_c(shutdown.clone());

            HttpServer::new(urls, config.server)?
                .run(listener, shutdown.signalled())
                .await?;
            tracing::info!("Shutdown complete");
        }
    }

    Ok(())
}
