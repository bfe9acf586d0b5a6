//! Trait definitions for the converter module.

use async_trait::async_trait;

use super::availability::ToolInfo;
use super::error::ConverterError;
use super::types::{ConversionOutcome, ConversionRequest};

/// A converter that turns one video file into one audio file.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Converts the request's input into its output.
    ///
    /// Never fails: every problem is reported through the returned outcome,
    /// which is produced exactly once per call.
    async fn convert(&self, request: &ConversionRequest) -> ConversionOutcome;

    /// Validates that the converter is properly configured and ready.
    async fn validate(&self) -> Result<ToolInfo, ConverterError>;
}
