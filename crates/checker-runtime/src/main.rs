//! # Pubkey-Mail Checker
//!
//! Command-line entry point.
//!
//! ## Startup Sequence
//!
//! 1. Parse flags
//! 2. Load configuration (defaults, file, `PM_*` environment, flags)
//! 3. Initialize telemetry
//! 4. Start the runtime and apply configured seeds
//! 5. Run until Ctrl+C, then shut down gracefully

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use checker_runtime::{CheckerConfig, CheckerRuntime};
use pm_telemetry::{init_telemetry, TelemetryConfig};

/// Watch the pubkey-mail feed and forward your mail.
#[derive(Parser, Debug)]
#[command(name = "pm-checker", version, about = "Watch the pubkey-mail feed and forward your mail")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only forward mail sent after this date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS UTC)
    #[arg(short, long)]
    after: Option<String>,

    /// Log filter (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

/// Load configuration from file, environment and flags.
fn load_config(args: &Args) -> Result<CheckerConfig> {
    let mut config = match &args.config {
        Some(path) => CheckerConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => CheckerConfig::default(),
    };

    config.apply_env();

    if let Some(after) = &args.after {
        config.checker.after = Some(after.clone());
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.json = true;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    let _telemetry = init_telemetry(
        TelemetryConfig::from_env()
            .with_log_level(config.logging.level.clone())
            .with_json_logs(config.logging.json),
    )
    .context("Failed to initialize telemetry")?;

    let runtime = CheckerRuntime::new(config).context("Failed to build checker services")?;
    runtime.start().await?;

    info!("Checker is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    let reports = runtime.shutdown().await;
    for report in reports {
        info!(
            address = %report.address,
            processed = report.links_processed,
            delivered = report.delivered,
            "Checker summary"
        );
    }

    Ok(())
}
