//! Drives one CLI run: availability check, confirmation, batch, report.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use audiorip_core::{
    AppState, BatchConverter, BatchHandle, BatchResult, Config, FfmpegConverter,
};

use crate::metrics;
use crate::progress::BatchProgress;
use crate::prompt;
use crate::Cli;

const INSTALL_HELP: &str = "\
ffmpeg was not found.

audiorip needs ffmpeg to extract audio.

To install it:
  1. Download ffmpeg from https://ffmpeg.org/download.html
     (or use your package manager, e.g. `apt install ffmpeg`, `brew install ffmpeg`)
  2. Put the ffmpeg binary on your PATH, or set converter.ffmpeg_path
     in audiorip.toml

Run audiorip again after installing.";

/// How the batch loop ended.
enum BatchEnd {
    Finished(BatchHandle),
    Abandoned,
}

pub async fn run(cli: Cli, config: Config) -> Result<ExitCode> {
    let converter = FfmpegConverter::new(config.converter.clone());

    let availability = converter.availability();
    if cli.check {
        return match availability.check().await {
            Ok(tool) => {
                println!(
                    "ffmpeg is available: {} (version {})",
                    tool.path.display(),
                    tool.version.as_deref().unwrap_or("unknown")
                );
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("{}\n\nDetails: {}", INSTALL_HELP, e);
                Ok(ExitCode::FAILURE)
            }
        };
    }

    if !availability.is_tool_available().await {
        eprintln!("{}", INSTALL_HELP);
        return Ok(ExitCode::FAILURE);
    }

    let mut state = AppState::new(config.session.clone());
    state.select_files(cli.files.iter().cloned())?;
    let output_dir = cli
        .output_dir
        .clone()
        .context("No output directory given (use --output-dir)")?;
    state.select_output_dir(&output_dir)?;
    let requests = state.build_requests()?;

    if !cli.yes {
        let question = format!(
            "Convert {} file(s)? Output: {}",
            requests.len(),
            output_dir.display()
        );
        if !prompt::confirm_async(question).await? {
            eprintln!("Cancelled.");
            return Ok(ExitCode::FAILURE);
        }
    }

    let batch = BatchConverter::from_config(Arc::new(converter), &config.batch);
    let handle = state.start_batch(batch)?;
    let progress = BatchProgress::new(handle.total())?;
    progress.println(&format!("Converting {} file(s)...", handle.total()));

    let end = poll_until_done(handle, &progress, &config).await;
    progress.finish();
    let handle = match end? {
        BatchEnd::Finished(handle) => handle,
        BatchEnd::Abandoned => {
            warn!("Exiting with a conversion in progress");
            eprintln!("Exiting; running conversions are left to finish on their own.");
            write_metrics(cli.metrics_file.as_deref())?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let result = handle.wait()?;
    metrics::BATCH_WALL_TIME_MS.set(result.duration_ms());
    report(&result, &config, cli.json)?;

    if cli.open {
        if let Err(e) = state.open_output_dir() {
            warn!("Failed to open output directory: {}", e);
            eprintln!("Could not open {}: {}", output_dir.display(), e);
        }
    }

    write_metrics(cli.metrics_file.as_deref())?;

    Ok(if result.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Shows progress until the worker exits or the user gives up on it.
async fn poll_until_done(
    mut handle: BatchHandle,
    progress: &BatchProgress,
    config: &Config,
) -> Result<BatchEnd> {
    let mut ticker = tokio::time::interval(config.session.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                progress.apply(handle.drain_status());
                if handle.is_finished() {
                    // Updates sent between the drain and the exit check.
                    progress.apply(handle.drain_status());
                    return Ok(BatchEnd::Finished(handle));
                }
            }
            interrupted = signal::ctrl_c() => {
                interrupted.context("Failed to listen for Ctrl+C")?;
                // Show what finished so far before blocking on the answer.
                progress.apply(handle.drain_status());
                let exit = progress
                    .confirm("A conversion is in progress. Exit anyway?")
                    .await?;
                let answer = if exit { "exit" } else { "continue" };
                metrics::INTERRUPTS_TOTAL.with_label_values(&[answer]).inc();
                if exit {
                    return Ok(BatchEnd::Abandoned);
                }
                info!("Continuing conversion after interrupt");
                progress.apply(handle.drain_status());
            }
        }
    }
}

fn report(result: &BatchResult, config: &Config, json: bool) -> Result<()> {
    if json {
        let text =
            serde_json::to_string_pretty(result).context("Failed to serialize batch result")?;
        println!("{}", text);
    } else {
        println!("{}", result.summary(config.batch.failure_detail_limit));
    }
    Ok(())
}

fn write_metrics(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    if path.is_dir() {
        bail!("Metrics path {:?} is a directory", path);
    }
    let text = metrics::encode_metrics()?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write metrics to {:?}", path))?;
    info!("Metrics written to {:?}", path);
    Ok(())
}
