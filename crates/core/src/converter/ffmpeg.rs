//! FFmpeg-based converter implementation.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::availability::{ToolAvailability, ToolInfo};
use super::config::ConverterConfig;
use super::error::{stderr_text, ConverterError};
use super::runner::{ProcessRunner, TokioProcessRunner};
use super::traits::Converter;
use super::types::{ConversionOutcome, ConversionRequest, AUDIO_BITRATE, AUDIO_CODEC};

/// FFmpeg-based converter implementation.
#[derive(Clone)]
pub struct FfmpegConverter {
    config: ConverterConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl FfmpegConverter {
    /// Creates a new FFmpeg converter with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self::with_runner(config, Arc::new(TokioProcessRunner::new()))
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    /// Creates a converter that launches processes through `runner`.
    pub fn with_runner(config: ConverterConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    /// Returns the converter configuration.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Availability check sharing this converter's binary and runner.
    pub fn availability(&self) -> ToolAvailability {
        ToolAvailability::with_runner(self.config.clone(), Arc::clone(&self.runner))
    }

    /// Builds the fixed ffmpeg argument list for one file.
    fn build_args(input_path: &Path, output_path: &Path) -> Vec<OsString> {
        vec![
            OsString::from("-i"),
            input_path.as_os_str().to_os_string(),
            OsString::from("-vn"), // Drop the video stream
            OsString::from("-acodec"),
            OsString::from(AUDIO_CODEC),
            OsString::from("-b:a"),
            OsString::from(AUDIO_BITRATE),
            OsString::from("-y"), // Overwrite output
            output_path.as_os_str().to_os_string(),
        ]
    }

    /// Runs ffmpeg for one request and classifies the result.
    async fn run_conversion(&self, request: &ConversionRequest) -> Result<(), ConverterError> {
        let output_path = request.output_path();

        // A stale file must not satisfy the existence check below
        match tokio::fs::remove_file(output_path).await {
            Ok(()) => debug!(path = ?output_path, "Removed existing output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ConverterError::StaleOutput {
                    path: output_path.to_path_buf(),
                    source,
                })
            }
        }

        let args = Self::build_args(request.input_path(), output_path);
        let output = self
            .runner
            .run(&self.config.ffmpeg_path, &args, None)
            .await
            .map_err(|source| ConverterError::SpawnFailed {
                program: self.config.ffmpeg_path.clone(),
                source,
            })?;

        if !output.success() {
            return Err(ConverterError::ToolFailed {
                exit_code: output.exit_code,
                stderr: stderr_text(&output.stderr),
            });
        }

        match tokio::fs::try_exists(output_path).await {
            Ok(true) => Ok(()),
            _ => Err(ConverterError::OutputMissing {
                path: output_path.to_path_buf(),
                stderr: stderr_text(&output.stderr),
            }),
        }
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn convert(&self, request: &ConversionRequest) -> ConversionOutcome {
        let start = Instant::now();
        debug!(
            input = ?request.input_path(),
            output = ?request.output_path(),
            "Starting conversion"
        );

        let result = self.run_conversion(request).await;
        if let Err(ref e) = result {
            warn!(input = ?request.input_path(), error = ?e, "Conversion failed");
        }

        ConversionOutcome::from_result(request, result, start.elapsed().as_millis() as u64)
    }

    async fn validate(&self) -> Result<ToolInfo, ConverterError> {
        self.availability().check().await
    }
}
