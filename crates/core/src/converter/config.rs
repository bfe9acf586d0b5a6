//! Configuration for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the FFmpeg-based converter.
///
/// Codec and bitrate are constants, see [`AUDIO_CODEC`](super::AUDIO_CODEC).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// How long the `-version` availability check may take.
    #[serde(default = "default_check_timeout")]
    pub check_timeout_secs: u64,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_check_timeout() -> u64 {
    10
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            check_timeout_secs: default_check_timeout(),
        }
    }
}

impl ConverterConfig {
    /// Creates a new config with a custom ffmpeg path.
    pub fn with_path(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ..Default::default()
        }
    }

    /// Sets the availability check timeout in seconds.
    pub fn with_check_timeout(mut self, check_timeout_secs: u64) -> Self {
        self.check_timeout_secs = check_timeout_secs;
        self
    }
}
