mod app;
mod metrics;
mod progress;
mod prompt;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audiorip_core::{load_config, load_config_from_env, validate_config, Config};

/// Config file picked up from the working directory when nothing else is given.
const DEFAULT_CONFIG_FILE: &str = "audiorip.toml";

/// Environment variable naming a config file.
const CONFIG_ENV_VAR: &str = "AUDIORIP_CONFIG";

/// Batch-convert video files to MP3 with ffmpeg.
#[derive(Debug, Parser)]
#[command(name = "audiorip", version, about)]
pub struct Cli {
    /// Video files to convert
    #[arg(value_name = "FILES", required_unless_present = "check")]
    pub files: Vec<PathBuf>,

    /// Directory the MP3 files are written to
    #[arg(short, long, value_name = "DIR", required_unless_present = "check")]
    pub output_dir: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Only check that ffmpeg is available
    #[arg(long)]
    pub check: bool,

    /// Print the batch result as JSON
    #[arg(long)]
    pub json: bool,

    /// Open the output directory when done
    #[arg(long)]
    pub open: bool,

    /// Write Prometheus metrics to this file when done
    #[arg(long, value_name = "PATH")]
    pub metrics_file: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, json: bool) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr; stdout carries the summary or JSON result.
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = resolve_config(cli.config.as_deref())?;
    info!("ffmpeg path: {:?}", config.converter.ffmpeg_path);
    info!("Max concurrent: {}", config.batch.max_concurrent);

    app::run(cli, config).await
}

/// Loads `--config`, then `$AUDIORIP_CONFIG`, then `./audiorip.toml` if
/// present, else defaults. Environment overrides apply in every case.
fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
        .or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        });

    let config = match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => {
            info!("No configuration file, using defaults");
            load_config_from_env().context("Failed to load config from environment")?
        }
    };

    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}
