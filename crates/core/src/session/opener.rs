//! Opens a directory in the platform's file browser.

use std::path::Path;
use std::process::{Command, Stdio};
use tracing::info;

use super::error::{SessionError, UserInputError};

/// Program used to reveal a directory on this platform.
pub fn file_browser() -> &'static str {
    if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

/// Launches the file browser on `dir` and returns without waiting for it.
pub fn open_directory(dir: &Path) -> Result<(), SessionError> {
    if !dir.exists() {
        return Err(UserInputError::OutputDirectoryMissing {
            path: dir.to_path_buf(),
        }
        .into());
    }
    if !dir.is_dir() {
        return Err(UserInputError::NotADirectory {
            path: dir.to_path_buf(),
        }
        .into());
    }

    let program = file_browser();
    Command::new(program)
        .arg(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| SessionError::OpenFailed {
            path: dir.to_path_buf(),
            source,
        })?;

    info!(program, dir = ?dir, "Opened output directory");
    Ok(())
}
