//! Yes/no prompts on the terminal.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Asks `question` on stderr and reads one line from stdin.
///
/// Anything other than "y" or "yes" is a no, end of input included.
pub fn confirm(question: &str) -> io::Result<bool> {
    let mut stderr = io::stderr().lock();
    write!(stderr, "{} [y/N] ", question)?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(is_yes(&line))
}

/// [`confirm`] on the blocking pool.
pub async fn confirm_async(question: impl Into<String>) -> Result<bool> {
    let question = question.into();
    tokio::task::spawn_blocking(move || confirm(&question))
        .await
        .context("Prompt task failed")?
        .context("Failed to read answer")
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
