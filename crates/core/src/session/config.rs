//! Session configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the foreground side of a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// How often the foreground drains status updates (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub status_poll_interval_ms: u64,
}

fn default_poll_interval() -> u64 {
    100
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            status_poll_interval_ms: default_poll_interval(),
        }
    }
}

impl SessionConfig {
    /// Polling interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.status_poll_interval_ms)
    }
}
