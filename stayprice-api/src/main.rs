//! stayprice - listing price estimation service
//!
//! `stayprice serve` runs the HTTP API; `stayprice estimate` answers a single
//! JSON request from a file or stdin and exits.

use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stayprice_common::config::{ConfigResolver, LoggingConfig, TomlConfig};
use stayprice_common::{EstimateRequest, Estimator, LinearModel};
use stayprice_api::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for stayprice
#[derive(Parser, Debug)]
#[command(name = "stayprice")]
#[command(about = "Nightly price estimates for short-term rental listings")]
#[command(version)]
struct Cli {
    /// Config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model artifact (JSON)
    #[arg(short, long, global = true, env = "STAYPRICE_MODEL")]
    model: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "STAYPRICE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Interface to bind to
        #[arg(short, long, env = "STAYPRICE_BIND")]
        bind: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "STAYPRICE_PORT")]
        port: Option<u16>,
    },
    /// Estimate one JSON request and print the JSON report
    Estimate {
        /// Request file; reads stdin when omitted
        request: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigResolver::new(cli.config.clone())
        .load()
        .context("Failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(model) = &cli.model {
        config.model_path = Some(model.clone());
    }

    init_tracing(&config.logging)?;

    info!(
        "Starting stayprice v{} ({})",
        env!("CARGO_PKG_VERSION"),
        if cfg!(debug_assertions) { "debug" } else { "release" }
    );

    let estimator = build_estimator(&config)?;

    match cli.command.unwrap_or(Command::Serve {
        bind: None,
        port: None,
    }) {
        Command::Serve { bind, port } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            let port = port.unwrap_or(config.port);
            serve(estimator, &bind, port).await
        }
        Command::Estimate { request } => estimate_once(&estimator, request),
    }
}

/// Initialize the tracing subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", logging.level)));

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

/// Validate the field tables and load the model; any failure is fatal
fn build_estimator(config: &TomlConfig) -> Result<Estimator> {
    let schema = config.schema().context("Invalid field configuration")?;

    let model_path = config.model_path();
    let model = LinearModel::load(&model_path)
        .with_context(|| format!("Failed to load model from {}", model_path.display()))?;

    let estimator =
        Estimator::new(schema, Arc::new(model)).with_prediction_budget(config.prediction_budget());
    info!(
        "Estimator ready (model: {}, prediction budget: {:?})",
        estimator.model_description(),
        config.prediction_budget()
    );
    Ok(estimator)
}

async fn serve(estimator: Estimator, bind: &str, port: u16) -> Result<()> {
    let app = build_router(AppState::new(estimator));

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("stayprice listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

fn estimate_once(estimator: &Estimator, request: Option<PathBuf>) -> Result<()> {
    let json = match &request {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read request from stdin")?;
            buffer
        }
    };

    let request: EstimateRequest = serde_json::from_str(&json).context("Invalid request JSON")?;
    let report = estimator.estimate(&request).map_err(with_input)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Attach the serialized model input to prediction failures
fn with_input(err: stayprice_common::Error) -> anyhow::Error {
    let input = err
        .input()
        .and_then(|input| serde_json::to_string(input).ok());
    match input {
        Some(input) => anyhow::anyhow!("{} (input: {})", err, input),
        None => err.into(),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
