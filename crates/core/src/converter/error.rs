//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Substituted for an empty stderr stream when ffmpeg fails silently.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Errors that can occur while probing or running the transcoder.
///
/// The `Display` text of the per-file variants is exactly what ends up in a
/// [`ConversionOutcome`](super::ConversionOutcome)'s `error_detail`.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// FFmpeg could not be started or is not functional.
    #[error("FFmpeg not available at {path}: {reason}")]
    ToolUnavailable { path: PathBuf, reason: String },

    /// The availability check did not finish in time.
    #[error("FFmpeg did not respond within {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The ffmpeg process could not be launched for this file.
    #[error("{source}")]
    SpawnFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A previous output file could not be removed before conversion.
    #[error("{source}")]
    StaleOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// FFmpeg exited with a non-zero status.
    #[error("{stderr}")]
    ToolFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// FFmpeg exited cleanly but the output file is not on disk.
    #[error("{stderr}")]
    OutputMissing { path: PathBuf, stderr: String },

    /// The input path has no file name to derive an output from.
    #[error("Input path has no file name: {path}")]
    InvalidInputPath { path: PathBuf },

    /// I/O error outside of process handling.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    /// Creates a tool-unavailable error.
    pub fn tool_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ToolUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error happened before ffmpeg got to run for the file.
    pub fn is_spawn_failure(&self) -> bool {
        matches!(
            self,
            Self::SpawnFailed { .. } | Self::StaleOutput { .. } | Self::Io(_)
        )
    }
}

/// Decodes captured stderr permissively.
///
/// Invalid UTF-8 is replaced rather than rejected, and an empty stream becomes
/// [`UNKNOWN_ERROR`].
pub fn stderr_text(stderr: &[u8]) -> String {
    if stderr.is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        String::from_utf8_lossy(stderr).into_owned()
    }
}
