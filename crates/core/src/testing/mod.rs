//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the subprocess and converter
//! seams, allowing batch runs to be tested without a real ffmpeg.
//!
//! # Example
//!
//! ```rust,ignore
//! use audiorip_core::testing::{MockProcessRunner, MockResponse};
//! use audiorip_core::{BatchConverter, ConverterConfig, FfmpegConverter};
//!
//! let runner = MockProcessRunner::new();
//! runner.set_default(MockResponse::converted());
//! runner.respond_for("/videos/b.mp4", MockResponse::exit(1, "", "unsupported codec"));
//!
//! let converter = FfmpegConverter::with_runner(ConverterConfig::default(), Arc::new(runner));
//! let result = BatchConverter::new(converter).convert_all(&requests, None).await;
//! ```

mod mock_converter;
mod mock_runner;

pub use mock_converter::{MockConverter, RecordedConversion};
pub use mock_runner::{MockProcessRunner, MockResponse, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    /// Create empty placeholder input files in `dir`.
    ///
    /// Returns their paths in the order given.
    pub fn input_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                std::fs::write(&path, b"not really a video").expect("Failed to create input file");
                path
            })
            .collect()
    }
}
