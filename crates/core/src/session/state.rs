//! Session state: the user's selections and the busy flag.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::batch::BatchConverter;
use crate::converter::{ConversionRequest, Converter};

use super::config::SessionConfig;
use super::error::{SessionError, UserInputError};
use super::opener;
use super::worker::{spawn_batch, BatchHandle};

/// Holds what the user picked and whether a batch is running.
///
/// Selections are locked while a batch is in flight; the flag is released by
/// the worker thread when it exits.
#[derive(Debug)]
pub struct AppState {
    config: SessionConfig,
    selected_files: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    converting: Arc<AtomicBool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl AppState {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            selected_files: Vec::new(),
            output_dir: None,
            converting: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn selected_files(&self) -> &[PathBuf] {
        &self.selected_files
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Whether a batch is currently running.
    pub fn is_converting(&self) -> bool {
        self.converting.load(Ordering::SeqCst)
    }

    /// Replaces the file selection. Repeated paths are kept once.
    pub fn select_files<I, P>(&mut self, files: I) -> Result<(), UserInputError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        if self.is_converting() {
            return Err(UserInputError::Busy);
        }

        let mut selected: Vec<PathBuf> = Vec::new();
        for file in files {
            let file = file.into();
            if selected.contains(&file) {
                warn!(file = ?file, "File selected more than once");
                continue;
            }
            selected.push(file);
        }

        info!(count = selected.len(), "Files selected");
        self.selected_files = selected;
        Ok(())
    }

    /// Sets the output directory, which must already exist.
    pub fn select_output_dir(&mut self, dir: impl Into<PathBuf>) -> Result<(), UserInputError> {
        if self.is_converting() {
            return Err(UserInputError::Busy);
        }

        let dir = dir.into();
        check_directory(&dir)?;
        info!(dir = ?dir, "Output directory selected");
        self.output_dir = Some(dir);
        Ok(())
    }

    /// Validates the selections and derives one request per file.
    pub fn build_requests(&self) -> Result<Vec<ConversionRequest>, UserInputError> {
        if self.selected_files.is_empty() {
            return Err(UserInputError::NoFilesSelected);
        }
        let output_dir = self
            .output_dir
            .as_deref()
            .ok_or(UserInputError::NoOutputDirectory)?;
        check_directory(output_dir)?;

        let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
        let mut requests = Vec::with_capacity(self.selected_files.len());

        for input in &self.selected_files {
            let request = ConversionRequest::derive(input, output_dir).map_err(|_| {
                UserInputError::InvalidInputPath {
                    path: input.clone(),
                }
            })?;

            if same_file(request.input_path(), request.output_path()) {
                return Err(UserInputError::InputIsOutput {
                    path: input.clone(),
                });
            }

            if let Some(first) = seen.get(request.output_path()) {
                return Err(UserInputError::DuplicateOutput {
                    first: first.to_path_buf(),
                    second: input.clone(),
                    output: request.output_path().to_path_buf(),
                });
            }
            seen.insert(request.output_path().to_path_buf(), input);
            requests.push(request);
        }

        Ok(requests)
    }

    /// Validates the selections and starts a batch in the background.
    ///
    /// Fails with [`UserInputError::Busy`] while another batch is running.
    pub fn start_batch<C>(&self, batch: BatchConverter<C>) -> Result<BatchHandle, SessionError>
    where
        C: Converter + 'static,
    {
        let requests = self.build_requests()?;

        if self
            .converting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(UserInputError::Busy.into());
        }

        info!(files = requests.len(), "Starting conversion");
        spawn_batch(batch, requests, Arc::clone(&self.converting))
    }

    /// Opens the selected output directory in the file browser.
    pub fn open_output_dir(&self) -> Result<(), SessionError> {
        let dir = self
            .output_dir
            .as_deref()
            .ok_or(UserInputError::NoOutputDirectory)?;
        opener::open_directory(dir)
    }
}

/// Whether both paths name the same file, following symlinks when both exist.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn check_directory(dir: &Path) -> Result<(), UserInputError> {
    if !dir.exists() {
        return Err(UserInputError::OutputDirectoryMissing {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(UserInputError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockConverter;
    use std::time::Duration;
    use tempfile::TempDir;

    fn wait_done(handle: &BatchHandle) {
        while !handle.is_finished() {
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_requires_files() {
        let dir = TempDir::new().unwrap();
        let mut state = AppState::default();
        state.select_output_dir(dir.path()).unwrap();

        assert_eq!(state.build_requests(), Err(UserInputError::NoFilesSelected));
    }

    #[test]
    fn test_requires_output_dir() {
        let mut state = AppState::default();
        state.select_files(["/videos/a.mp4"]).unwrap();

        assert_eq!(
            state.build_requests(),
            Err(UserInputError::NoOutputDirectory)
        );
    }

    #[test]
    fn test_output_dir_must_exist() {
        let dir = TempDir::new().unwrap();
        let mut state = AppState::default();

        let err = state.select_output_dir(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, UserInputError::OutputDirectoryMissing { .. }));
        assert!(state.output_dir().is_none());
    }

    #[test]
    fn test_output_dir_removed_after_selection() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let mut state = AppState::default();
        state.select_files(["/videos/a.mp4"]).unwrap();
        state.select_output_dir(&out).unwrap();
        std::fs::remove_dir(&out).unwrap();

        assert!(matches!(
            state.build_requests(),
            Err(UserInputError::OutputDirectoryMissing { .. })
        ));
    }

    #[test]
    fn test_builds_requests_in_selection_order() {
        let dir = TempDir::new().unwrap();
        let mut state = AppState::default();
        state
            .select_files(["/videos/b.mkv", "/videos/a.mp4", "/videos/b.mkv"])
            .unwrap();
        state.select_output_dir(dir.path()).unwrap();

        let requests = state.build_requests().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].output_path(), dir.path().join("b.mp3"));
        assert_eq!(requests[1].output_path(), dir.path().join("a.mp3"));
    }

    #[test]
    fn test_duplicate_output_rejected() {
        let dir = TempDir::new().unwrap();
        let mut state = AppState::default();
        state
            .select_files(["/videos/clip.mp4", "/other/clip.mkv"])
            .unwrap();
        state.select_output_dir(dir.path()).unwrap();

        match state.build_requests() {
            Err(UserInputError::DuplicateOutput {
                first,
                second,
                output,
            }) => {
                assert_eq!(first, PathBuf::from("/videos/clip.mp4"));
                assert_eq!(second, PathBuf::from("/other/clip.mkv"));
                assert_eq!(output, dir.path().join("clip.mp3"));
            }
            other => panic!("expected duplicate output, got {:?}", other),
        }
    }

    #[test]
    fn test_input_that_is_its_own_output_rejected() {
        let dir = TempDir::new().unwrap();
        let song = dir.path().join("song.mp3");
        std::fs::write(&song, b"user audio").unwrap();

        let mut state = AppState::default();
        state.select_files([&song]).unwrap();
        state.select_output_dir(dir.path()).unwrap();

        assert_eq!(
            state.build_requests(),
            Err(UserInputError::InputIsOutput { path: song.clone() })
        );
        assert_eq!(std::fs::read(&song).unwrap(), b"user audio");
    }

    #[cfg(unix)]
    #[test]
    fn test_input_is_output_through_symlinked_dir() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("link")).unwrap();
        let song = real.join("song.mp3");
        std::fs::write(&song, b"user audio").unwrap();

        let mut state = AppState::default();
        state.select_files([&song]).unwrap();
        state.select_output_dir(dir.path().join("link")).unwrap();

        assert!(matches!(
            state.build_requests(),
            Err(UserInputError::InputIsOutput { .. })
        ));
    }

    #[test]
    fn test_mp3_input_into_other_dir_allowed() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let song = dir.path().join("song.mp3");
        std::fs::write(&song, b"user audio").unwrap();

        let mut state = AppState::default();
        state.select_files([&song]).unwrap();
        state.select_output_dir(&out).unwrap();

        let requests = state.build_requests().unwrap();
        assert_eq!(requests[0].output_path(), out.join("song.mp3"));
    }

    #[test]
    fn test_invalid_input_path() {
        let dir = TempDir::new().unwrap();
        let mut state = AppState::default();
        state.select_files(["/"]).unwrap();
        state.select_output_dir(dir.path()).unwrap();

        assert!(matches!(
            state.build_requests(),
            Err(UserInputError::InvalidInputPath { .. })
        ));
    }

    #[test]
    fn test_busy_while_converting() {
        let dir = TempDir::new().unwrap();
        let converter = MockConverter::new();
        tokio_test::block_on(converter.set_default_delay(Duration::from_millis(100)));

        let mut state = AppState::default();
        state.select_files(["/videos/a.mp4"]).unwrap();
        state.select_output_dir(dir.path()).unwrap();

        let handle = state
            .start_batch(BatchConverter::new(converter.clone()))
            .unwrap();
        assert!(state.is_converting());

        let second = state.start_batch(BatchConverter::new(converter));
        assert!(matches!(
            second,
            Err(SessionError::Input(UserInputError::Busy))
        ));
        assert_eq!(
            state.select_files(["/videos/b.mp4"]),
            Err(UserInputError::Busy)
        );

        wait_done(&handle);
        let result = handle.wait().unwrap();
        assert_eq!(result.succeeded, 1);
        assert!(!state.is_converting());

        // Selections unlock once the batch is done.
        state.select_files(["/videos/b.mp4"]).unwrap();
    }

    #[test]
    fn test_invalid_selection_does_not_set_busy() {
        let state = AppState::default();
        let result = state.start_batch(BatchConverter::new(MockConverter::new()));

        assert!(matches!(
            result,
            Err(SessionError::Input(UserInputError::NoFilesSelected))
        ));
        assert!(!state.is_converting());
    }

    #[test]
    fn test_open_without_output_dir() {
        let state = AppState::default();
        assert!(matches!(
            state.open_output_dir(),
            Err(SessionError::Input(UserInputError::NoOutputDirectory))
        ));
    }
}
