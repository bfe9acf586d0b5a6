//! Types for the batch module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::converter::{display_name, ConversionOutcome};

/// Number of failures listed inline in a [`BatchSummary`] by default.
pub const DEFAULT_FAILURE_DETAIL_LIMIT: usize = 5;

/// One failed file of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    /// Input file that failed.
    pub input_path: PathBuf,
    /// Error text of the failure.
    pub error_detail: String,
}

impl FailureDetail {
    /// Creates a failure detail.
    pub fn new(input_path: impl Into<PathBuf>, error_detail: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            error_detail: error_detail.into(),
        }
    }

    /// Last non-empty line of the error, which is where ffmpeg puts the cause.
    pub fn headline(&self) -> &str {
        self.error_detail
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
    }
}

/// Aggregated result of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Identifier of the batch, as used in logs.
    pub batch_id: Uuid,
    /// Number of requests in the batch.
    pub total: usize,
    /// Number of files converted successfully.
    pub succeeded: usize,
    /// Failed files, in request order.
    pub failures: Vec<FailureDetail>,
    /// Every outcome, in request order.
    pub outcomes: Vec<ConversionOutcome>,
    /// When the batch started.
    pub started_at: DateTime<Utc>,
    /// When the last conversion finished.
    pub finished_at: DateTime<Utc>,
}

impl BatchResult {
    /// Folds outcomes (given in request order) into a result.
    pub fn from_outcomes(
        batch_id: Uuid,
        outcomes: Vec<ConversionOutcome>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
        let failures = outcomes
            .iter()
            .filter(|o| !o.succeeded)
            .map(|o| FailureDetail::new(o.input_path.clone(), o.error_detail.clone()))
            .collect();

        Self {
            batch_id,
            total: outcomes.len(),
            succeeded,
            failures,
            outcomes,
            started_at,
            finished_at,
        }
    }

    /// Number of failed files.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Whether every file converted.
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Wall time of the whole batch in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Compact view listing at most `limit` failures.
    pub fn summary(&self, limit: usize) -> BatchSummary {
        BatchSummary {
            total: self.total,
            succeeded: self.succeeded,
            shown: self.failures.iter().take(limit).cloned().collect(),
            omitted: self.failures.len().saturating_sub(limit),
        }
    }
}

/// Compact presentation of a [`BatchResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Number of requests in the batch.
    pub total: usize,
    /// Number of files converted successfully.
    pub succeeded: usize,
    /// Leading failures, in request order.
    pub shown: Vec<FailureDetail>,
    /// Failures not listed in `shown`.
    pub omitted: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shown.is_empty() && self.omitted == 0 {
            let noun = if self.total == 1 { "file" } else { "files" };
            return write!(f, "All {} {} converted successfully.", self.total, noun);
        }

        writeln!(f, "Converted {}/{} files", self.succeeded, self.total)?;
        writeln!(f)?;
        write!(f, "Failed files:")?;
        for failure in &self.shown {
            write!(
                f,
                "\n• {}: {}",
                display_name(&failure.input_path),
                failure.headline()
            )?;
        }
        if self.omitted > 0 {
            write!(f, "\n...and {} more", self.omitted)?;
        }
        Ok(())
    }
}

/// Progress message sent from the batch to the presentation layer.
///
/// Emitted once per finished file, in completion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Position of the file in the request list.
    pub index: usize,
    /// Number of files finished so far, this one included.
    pub completed: usize,
    /// Number of files in the batch.
    pub total: usize,
    /// Input file that finished.
    pub input_path: PathBuf,
    /// Whether it converted.
    pub succeeded: bool,
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.succeeded { '✓' } else { '✗' };
        write!(
            f,
            "[{}/{}] {} {}",
            self.completed,
            self.total,
            mark,
            display_name(&self.input_path)
        )
    }
}
