//! Progress bar for a running batch.

use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use audiorip_core::StatusUpdate;

use crate::prompt;

const TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} | {msg}";

/// Determinate bar advanced once per finished file.
///
/// indicatif hides the bar when stderr is not a terminal; the per-file lines
/// are still written in that case.
pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    pub fn new(total: usize) -> Result<Self> {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(progress_style()?);
        bar.enable_steady_tick(Duration::from_millis(100));
        Ok(Self::with_bar(bar))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        Self { bar }
    }

    /// Advances the bar and logs a ✓/✗ line for every update.
    pub fn apply(&self, updates: Vec<StatusUpdate>) {
        for update in updates {
            let line = update.to_string();
            self.println(&line);
            self.bar.set_message(line);
            self.bar.inc(1);
        }
    }

    /// Writes a line above the bar.
    pub fn println(&self, line: &str) {
        if self.bar.is_hidden() {
            eprintln!("{}", line);
        } else {
            self.bar.println(line);
        }
    }

    /// Asks a yes/no question with the bar cleared from the screen.
    pub async fn confirm(&self, question: &'static str) -> Result<bool> {
        let bar = self.bar.clone();
        tokio::task::spawn_blocking(move || bar.suspend(|| prompt::confirm(question)))
            .await
            .context("Prompt task failed")?
            .context("Failed to read answer")
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn progress_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::with_template(TEMPLATE)
        .context("Invalid progress template")?
        .progress_chars("#>-"))
}
