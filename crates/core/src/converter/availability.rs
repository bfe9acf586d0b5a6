//! FFmpeg availability check.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::metrics;

use super::config::ConverterConfig;
use super::error::{stderr_text, ConverterError};
use super::runner::{ProcessRunner, TokioProcessRunner};

/// Information about a working ffmpeg installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Binary that answered `-version`.
    pub path: PathBuf,
    /// Version string reported by `-version`, when recognisable.
    pub version: Option<String>,
}

/// Verifies ffmpeg is reachable and runnable before offering conversions.
///
/// The result is advisory: ffmpeg can still disappear before a later
/// conversion, which then fails per file.
#[derive(Clone)]
pub struct ToolAvailability {
    config: ConverterConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl ToolAvailability {
    /// Creates a check that launches real processes.
    pub fn new(config: ConverterConfig) -> Self {
        Self::with_runner(config, Arc::new(TokioProcessRunner::new()))
    }

    /// Creates a check using the given process runner.
    pub fn with_runner(config: ConverterConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    /// Returns true only if `ffmpeg -version` starts, finishes within the
    /// timeout and exits zero. Never fails.
    pub async fn is_tool_available(&self) -> bool {
        match self.check().await {
            Ok(info) => {
                debug!(path = ?info.path, version = ?info.version, "FFmpeg is available");
                metrics::TOOL_CHECKS.with_label_values(&["available"]).inc();
                true
            }
            Err(e) => {
                warn!(error = %e, "FFmpeg availability check failed");
                metrics::TOOL_CHECKS.with_label_values(&["unavailable"]).inc();
                false
            }
        }
    }

    /// Runs `ffmpeg -version` and reports why it is unusable.
    pub async fn check(&self) -> Result<ToolInfo, ConverterError> {
        let path = &self.config.ffmpeg_path;
        let timeout = Duration::from_secs(self.config.check_timeout_secs);

        let output = self
            .runner
            .run(path, &[OsString::from("-version")], Some(timeout))
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::TimedOut {
                    ConverterError::Timeout {
                        timeout_secs: self.config.check_timeout_secs,
                    }
                } else {
                    ConverterError::tool_unavailable(path, e.to_string())
                }
            })?;

        if !output.success() {
            return Err(ConverterError::tool_unavailable(
                path,
                format!(
                    "exited with code {:?}: {}",
                    output.exit_code,
                    stderr_text(&output.stderr).trim()
                ),
            ));
        }

        Ok(ToolInfo {
            path: path.clone(),
            version: parse_version(&String::from_utf8_lossy(&output.stdout)),
        })
    }
}

/// Extracts the version from `ffmpeg -version` output.
fn parse_version(stdout: &str) -> Option<String> {
    let first_line = stdout.lines().next()?;
    let re = Regex::new(r"^\S+ version (\S+)").ok()?;
    re.captures(first_line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
