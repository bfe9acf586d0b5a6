//! Mock converter for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::converter::{
    ConversionOutcome, ConversionRequest, Converter, ConverterError, ToolInfo,
};

/// A recorded conversion for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// The request that was submitted.
    pub request: ConversionRequest,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the Converter trait.
///
/// Provides controllable behavior for testing:
/// - Track conversion requests for assertions
/// - Simulate per-file failures
/// - Simulate per-file durations to control completion order
/// - Simulate an unavailable tool
///
/// No file is written; outcomes are produced directly.
///
/// # Example
///
/// ```rust,ignore
/// use audiorip_core::testing::MockConverter;
///
/// let converter = MockConverter::new();
/// converter.fail_for("/videos/b.mp4", "unsupported codec").await;
///
/// let outcome = converter.convert(&request).await;
///
/// let conversions = converter.recorded_conversions().await;
/// assert_eq!(conversions.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockConverter {
    /// Recorded conversions.
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    /// Error detail for inputs that should fail.
    failures: Arc<RwLock<HashMap<PathBuf, String>>>,
    /// Simulated durations for specific inputs.
    delays: Arc<RwLock<HashMap<PathBuf, Duration>>>,
    /// Simulated duration for all other inputs.
    default_delay: Arc<RwLock<Duration>>,
    /// If set, validation fails with this reason.
    unavailable_reason: Arc<RwLock<Option<String>>>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter where every file succeeds instantly.
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            delays: Arc::new(RwLock::new(HashMap::new())),
            default_delay: Arc::new(RwLock::new(Duration::ZERO)),
            unavailable_reason: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded conversions, in completion order.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the number of conversions performed.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Make conversions of `input` fail with `detail`.
    pub async fn fail_for(&self, input: impl AsRef<Path>, detail: impl Into<String>) {
        self.failures
            .write()
            .await
            .insert(input.as_ref().to_path_buf(), detail.into());
    }

    /// Set the simulated duration for `input`.
    pub async fn set_delay_for(&self, input: impl AsRef<Path>, delay: Duration) {
        self.delays
            .write()
            .await
            .insert(input.as_ref().to_path_buf(), delay);
    }

    /// Set the simulated duration for inputs without a specific one.
    pub async fn set_default_delay(&self, delay: Duration) {
        *self.default_delay.write().await = delay;
    }

    /// Make `validate` report the tool as unavailable.
    pub async fn set_unavailable(&self, reason: impl Into<String>) {
        *self.unavailable_reason.write().await = Some(reason.into());
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(&self, request: &ConversionRequest) -> ConversionOutcome {
        let delay = match self.delays.read().await.get(request.input_path()) {
            Some(delay) => *delay,
            None => *self.default_delay.read().await,
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failure = self
            .failures
            .read()
            .await
            .get(request.input_path())
            .cloned();

        let outcome = match failure {
            Some(stderr) => ConversionOutcome::failure(
                request,
                &ConverterError::ToolFailed {
                    exit_code: Some(1),
                    stderr,
                },
                delay.as_millis() as u64,
            ),
            None => ConversionOutcome::success(request, delay.as_millis() as u64),
        };

        self.conversions.write().await.push(RecordedConversion {
            request: request.clone(),
            success: outcome.succeeded,
        });

        outcome
    }

    async fn validate(&self) -> Result<ToolInfo, ConverterError> {
        if let Some(reason) = self.unavailable_reason.read().await.clone() {
            return Err(ConverterError::tool_unavailable("mock", reason));
        }
        Ok(ToolInfo {
            path: PathBuf::from("mock"),
            version: Some("0.0.0-mock".to_string()),
        })
    }
}
