mod app;
mod config_cmd;
mod status_cmd;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use docent_config::{default_config_path, load_and_prepare, validate, DocentConfig};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "docent")]
#[command(about = "Docent: retrieval-augmented chat over your scanned documents")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $DOCENT_CONFIG or ~/.docent/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Rebuild the embeddings store from the source directory
    Index,
    /// Query a running server's health endpoint
    Status,
    /// Print the effective configuration with secrets masked
    Config {
        /// Write a default config file instead
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = load_and_prepare(&config_path).await?;

    let _guard = docent_logging::init_logger(config.paths.log_dir.as_deref(), &config.logging.level);

    match cli.command {
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config).await?;
        }
        Commands::Index => run_index(&config).await?,
        Commands::Status => status_cmd::run(&config).await?,
        Commands::Config { init } => config_cmd::run(&config, &config_path, init).await?,
    }

    Ok(())
}

fn ensure_valid(config: &DocentConfig) -> Result<()> {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if !report.is_valid() {
        for e in &report.errors {
            error!(path = %e.path, message = %e.message, "Config error");
        }
        bail!("configuration has {} error(s)", report.errors.len());
    }
    Ok(())
}

async fn run_server(config: DocentConfig) -> Result<()> {
    ensure_valid(&config)?;
    info!(
        bind = %config.server.bind,
        port = config.server.port,
        source = %config.paths.source_dir.display(),
        data = %config.paths.data_dir.display(),
        "Starting Docent"
    );

    let runtime = app::build_runtime(&config).await?;
    app::spawn_store_load(&runtime, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.server.bind, config.server.port))?;
    docent_gateway::start_server(addr, runtime.state).await
}

async fn run_index(config: &DocentConfig) -> Result<()> {
    ensure_valid(config)?;
    let runtime = app::build_runtime(config).await?;
    let count = runtime
        .state
        .store
        .rebuild(&runtime.ingestor, &config.paths.source_dir, runtime.embedder.as_ref())
        .await?;
    println!(
        "Indexed {} chunks from {} into {}",
        count,
        config.paths.source_dir.display(),
        runtime.state.store.path().display()
    );
    Ok(())
}
