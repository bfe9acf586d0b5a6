//! Converter module for extracting audio from video files.
//!
//! This module provides the `Converter` trait and an FFmpeg implementation
//! that turns one video file into one MP3 file with fixed settings
//! (`libmp3lame`, 192 kbit/s, video stream dropped).
//!
//! # Features
//!
//! - Availability check of the ffmpeg binary with a bounded wait
//! - One subprocess per file, stderr captured for diagnostics
//! - Success requires exit status zero *and* an output file on disk
//! - Pre-existing outputs are removed first, so reruns are idempotent
//!
//! # Example
//!
//! ```ignore
//! use audiorip_core::converter::{Converter, ConversionRequest, FfmpegConverter};
//!
//! let converter = FfmpegConverter::with_defaults();
//!
//! if !converter.availability().is_tool_available().await {
//!     eprintln!("ffmpeg is not installed");
//!     return;
//! }
//!
//! let request = ConversionRequest::derive("/videos/talk.mp4", "/music")?;
//! let outcome = converter.convert(&request).await;
//! if !outcome.succeeded {
//!     eprintln!("{}: {}", outcome.input_path.display(), outcome.error_detail);
//! }
//! ```

mod availability;
mod config;
mod error;
mod ffmpeg;
mod runner;
mod traits;
mod types;

pub use availability::{ToolAvailability, ToolInfo};
pub use config::ConverterConfig;
pub use error::{stderr_text, ConverterError, UNKNOWN_ERROR};
pub use ffmpeg::FfmpegConverter;
pub use runner::{ProcessOutput, ProcessRunner, TokioProcessRunner};
pub use traits::Converter;
pub use types::{
    display_name, ConversionOutcome, ConversionRequest, FailureKind, AUDIO_BITRATE, AUDIO_CODEC,
    OUTPUT_EXTENSION,
};
