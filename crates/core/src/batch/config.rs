//! Batch configuration.

use serde::{Deserialize, Serialize};

use super::types::DEFAULT_FAILURE_DETAIL_LIMIT;

/// Configuration for batch runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchConfig {
    /// Maximum ffmpeg processes running at once (0 = unlimited).
    /// Every file gets its own process immediately when unlimited.
    #[serde(default)]
    pub max_concurrent: usize,

    /// Failures listed inline in the final summary.
    /// The rest are counted as "...and N more".
    #[serde(default = "default_failure_detail_limit")]
    pub failure_detail_limit: usize,
}

fn default_failure_detail_limit() -> usize {
    DEFAULT_FAILURE_DETAIL_LIMIT
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 0,
            failure_detail_limit: default_failure_detail_limit(),
        }
    }
}

impl BatchConfig {
    /// Concurrency cap, `None` when unlimited.
    pub fn concurrency_limit(&self) -> Option<usize> {
        (self.max_concurrent > 0).then_some(self.max_concurrent)
    }
}
