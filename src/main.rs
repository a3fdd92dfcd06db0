//! failstream - Machine Failure Prediction Stream Client
//!
//! Streams machine sensor records from a CSV file to a remote failure
//! prediction service and shows the outcomes as they arrive.
//!
//! # Usage
//!
//! ```bash
//! # Stream a CSV file, one record per second
//! failstream stream data/machines.csv
//!
//! # Single prediction
//! failstream predict --product-id L47230 --type L --air-temperature 298.1 \
//!     --process-temperature 308.6 --rotational-speed 1551 --torque 42.8 --tool-wear 0
//!
//! # Local dashboard API
//! failstream serve --addr 127.0.0.1:8080
//! ```
//!
//! # Environment Variables
//!
//! - `FAILSTREAM_CONFIG`: Path to the TOML config file (default: ./failstream.toml)
//! - `FAILSTREAM_BASE_URL`: Prediction service address
//! - `FAILSTREAM_CORS_ORIGINS`: Extra origins allowed by the dashboard API
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use failstream::api::{self, DashboardState, DynService};
use failstream::config::ClientConfig;
use failstream::render::ConsoleTable;
use failstream::{
    HttpPredictionClient, PacingController, PredictionForm, StreamOrchestrator, StreamPhase,
    StreamState, SubmissionClient,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "failstream")]
#[command(about = "Machine failure prediction stream client")]
#[command(version)]
struct CliArgs {
    /// Config file (overrides FAILSTREAM_CONFIG and ./failstream.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Prediction service base URL
    #[arg(long, global = true, env = "FAILSTREAM_BASE_URL")]
    base_url: Option<String>,

    /// Delay between streamed records in milliseconds (0 = no delay)
    #[arg(long, global = true)]
    pacing_ms: Option<u64>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Predict a single record given on the command line
    Predict(PredictArgs),

    /// Stream every record of a CSV file to the service
    Stream {
        /// CSV file: header line, then product_id,type,air,process,speed,torque,wear
        csv: PathBuf,
    },

    /// Run the local dashboard API
    Serve {
        /// Override the bind address (default: 127.0.0.1:8080)
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Check that the prediction service is reachable
    Health,
}

#[derive(clap::Args, Debug)]
struct PredictArgs {
    #[arg(long)]
    product_id: String,
    /// Machine type: L, M or H
    #[arg(long = "type")]
    machine_type: String,
    #[arg(long)]
    air_temperature: f64,
    #[arg(long)]
    process_temperature: f64,
    #[arg(long)]
    rotational_speed: f64,
    #[arg(long)]
    torque: f64,
    #[arg(long)]
    tool_wear: f64,
}

impl From<PredictArgs> for PredictionForm {
    fn from(args: PredictArgs) -> Self {
        PredictionForm {
            product_id: args.product_id,
            machine_type: args.machine_type,
            air_temperature: args.air_temperature,
            process_temperature: args.process_temperature,
            rotational_speed: args.rotational_speed,
            torque: args.torque,
            tool_wear: args.tool_wear,
        }
    }
}

// ============================================================================
// Setup
// ============================================================================

fn load_config(args: &CliArgs) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::load_from_file(path)?,
        None => ClientConfig::load(),
    };

    if let Some(url) = &args.base_url {
        config.service.base_url = url.clone();
    }
    if let Some(ms) = args.pacing_ms {
        config.stream.pacing_ms = ms;
    }

    config.validate()?;
    Ok(config)
}

fn http_client(config: &ClientConfig) -> Result<HttpPredictionClient> {
    HttpPredictionClient::new(&config.service.base_url, config.service.timeout())
        .context("Failed to build HTTP client")
}

/// Cancel `token` on Ctrl+C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down...");
            token.cancel();
        }
    });
}

// ============================================================================
// Commands
// ============================================================================

async fn run_predict(config: &ClientConfig, args: PredictArgs) -> Result<()> {
    let record = match PredictionForm::from(args).into_record() {
        Ok(record) => record,
        Err(message) => bail!(message),
    };

    let client = SubmissionClient::new(http_client(config)?);
    let result = client.submit_single(&record).await;
    println!("{}", result);

    if result.outcome().is_none() {
        bail!("Prediction failed for {}", record.product_id);
    }
    Ok(())
}

async fn run_stream(config: &ClientConfig, csv: PathBuf) -> Result<()> {
    let text = tokio::fs::read_to_string(&csv)
        .await
        .with_context(|| format!("Failed to read CSV file: {}", csv.display()))?;
    let source = csv
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| csv.display().to_string());

    let orchestrator = StreamOrchestrator::new(
        SubmissionClient::new(http_client(config)?),
        PacingController::from_millis(config.stream.pacing_ms),
    );

    let mut state = StreamState::new();
    state.subscribe(Box::new(ConsoleTable::stdout()));

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let summary = orchestrator.run(&mut state, &source, &text, &cancel).await?;
    if summary.skipped_rows > 0 {
        warn!(
            skipped = summary.skipped_rows,
            "Skipped rows with too few fields"
        );
    }
    info!(
        source = %summary.source,
        records = summary.submitted,
        elapsed_ms = summary.elapsed_ms,
        "Stream {}", summary.phase
    );

    if summary.phase == StreamPhase::Cancelled {
        warn!("Stream cancelled before all records were sent");
    }
    Ok(())
}

async fn run_serve(config: &ClientConfig, addr: Option<String>) -> Result<()> {
    let addr = addr.unwrap_or_else(|| config.dashboard.bind_addr.clone());
    let service: DynService = Box::new(http_client(config)?);

    let orchestrator = StreamOrchestrator::new(
        SubmissionClient::new(service),
        PacingController::from_millis(config.stream.pacing_ms),
    );
    let state = DashboardState::new(
        orchestrator,
        config.dashboard.event_buffer,
        config.asset_url(),
    );

    let shutdown = CancellationToken::new();
    cancel_on_ctrl_c(shutdown.clone());

    api::serve(&addr, state, shutdown).await
}

async fn run_health(config: &ClientConfig) -> Result<()> {
    let client = http_client(config)?;
    let status = client
        .health()
        .await
        .with_context(|| format!("Prediction service unreachable at {}", client.base_url()))?;
    println!("{}: {}", client.base_url(), status);
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    info!(
        service = %config.service.base_url,
        pacing_ms = config.stream.pacing_ms,
        "failstream {}",
        env!("CARGO_PKG_VERSION")
    );

    match args.command {
        SubCommand::Predict(predict) => run_predict(&config, predict).await,
        SubCommand::Stream { csv } => run_stream(&config, csv).await,
        SubCommand::Serve { addr } => run_serve(&config, addr).await,
        SubCommand::Health => run_health(&config).await,
    }
}
