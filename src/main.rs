use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use data_optimizer::config::{Config, DEFAULT_CONFIG_PATH};
use data_optimizer::observability;
use data_optimizer::server::{self, AppState};

#[derive(Parser)]
#[command(name = "data_optimizer")]
#[command(about = "Record refinement pipeline: quality scoring, anonymization and enrichment")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the pipeline once over a JSON file
    Optimize {
        /// JSON object or array of objects with a `text` field
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the resolved configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    observability::init_logging(&config.logging.dir, &config.logging.file_prefix);

    match cli.command {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let handle = observability::init().context("installing metrics recorder")?;
            let state = AppState::from_config(&config)?.with_metrics(handle);
            info!(port, "starting server");
            server::start_server(state, &config.server.host, port).await?;
        }
        Commands::Optimize { input } => {
            println!("🔄 Optimizing {}...", input.display());
            let raw = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("reading {}", input.display()))?;
            let payload: serde_json::Value =
                serde_json::from_str(&raw).with_context(|| format!("parsing {}", input.display()))?;

            let state = AppState::from_config(&config)?;
            match state.optimize.execute(&payload).await {
                Ok(outcome) => {
                    println!("✅ Data optimized successfully!");
                    println!("   Records: {}", outcome.stored.records);
                    println!("   Refined: {}", outcome.stored.refined_path.display());
                    println!("   Blob:    {}", outcome.stored.blob_path.display());
                }
                Err(e) => {
                    error!("Optimization failed: {}", e);
                    println!("❌ Optimization failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::ShowConfig => {
            print!("{}", config.to_toml()?);
        }
    }
    Ok(())
}
