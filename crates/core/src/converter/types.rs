//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::ConverterError;

/// Audio codec handed to ffmpeg.
pub const AUDIO_CODEC: &str = "libmp3lame";

/// Audio bitrate handed to ffmpeg.
pub const AUDIO_BITRATE: &str = "192k";

/// Extension of every produced file.
pub const OUTPUT_EXTENSION: &str = "mp3";

/// A single input-file to output-file conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    input_path: PathBuf,
    output_path: PathBuf,
}

impl ConversionRequest {
    /// Derives the request for `input_path` inside `output_dir`.
    ///
    /// The output keeps the input's file stem and takes the `.mp3` extension.
    pub fn derive(
        input_path: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Result<Self, ConverterError> {
        let input_path = input_path.as_ref();
        let stem = input_path
            .file_stem()
            .ok_or_else(|| ConverterError::InvalidInputPath {
                path: input_path.to_path_buf(),
            })?;

        let mut file_name = stem.to_os_string();
        file_name.push(".");
        file_name.push(OUTPUT_EXTENSION);

        Ok(Self {
            input_path: input_path.to_path_buf(),
            output_path: output_dir.as_ref().join(file_name),
        })
    }

    /// Path of the video file to read.
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Path of the audio file to write.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// File name of the input, for display.
    pub fn display_name(&self) -> String {
        display_name(&self.input_path)
    }
}

/// Why a conversion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The process could not be launched (missing binary, OS error, stale output).
    SpawnFailure,
    /// The process ran but exited non-zero or wrote no output.
    ToolExecutionFailure,
}

impl FailureKind {
    /// Label used in metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpawnFailure => "spawn_failure",
            Self::ToolExecutionFailure => "tool_failure",
        }
    }
}

/// Terminal result of converting one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    /// Input file that was converted.
    pub input_path: PathBuf,
    /// Output file that was (or should have been) written.
    pub output_path: PathBuf,
    /// Whether ffmpeg exited zero and the output exists.
    pub succeeded: bool,
    /// Error text; empty on success.
    pub error_detail: String,
    /// Failure classification; `None` on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    /// Wall time spent on this file.
    pub duration_ms: u64,
}

impl ConversionOutcome {
    /// Successful outcome for `request`.
    pub fn success(request: &ConversionRequest, duration_ms: u64) -> Self {
        Self {
            input_path: request.input_path.clone(),
            output_path: request.output_path.clone(),
            succeeded: true,
            error_detail: String::new(),
            failure_kind: None,
            duration_ms,
        }
    }

    /// Failed outcome for `request`, carrying the error's message.
    pub fn failure(request: &ConversionRequest, error: &ConverterError, duration_ms: u64) -> Self {
        let kind = if error.is_spawn_failure() {
            FailureKind::SpawnFailure
        } else {
            FailureKind::ToolExecutionFailure
        };

        Self {
            input_path: request.input_path.clone(),
            output_path: request.output_path.clone(),
            succeeded: false,
            error_detail: error.to_string(),
            failure_kind: Some(kind),
            duration_ms,
        }
    }

    /// Builds the outcome from the result of running one conversion.
    pub fn from_result(
        request: &ConversionRequest,
        result: Result<(), ConverterError>,
        duration_ms: u64,
    ) -> Self {
        match result {
            Ok(()) => Self::success(request, duration_ms),
            Err(e) => Self::failure(request, &e, duration_ms),
        }
    }

    /// Label used in metrics and logs.
    pub fn result_label(&self) -> &'static str {
        self.failure_kind.map_or("success", |k| k.as_str())
    }
}

/// File name of `path`, falling back to the whole path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
