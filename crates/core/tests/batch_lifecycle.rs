//! Batch lifecycle integration tests.
//!
//! These tests drive a full session with stubbed subprocesses:
//! - Selection validation before anything runs
//! - Background execution and status polling
//! - Per-file failure isolation and the final summary
//! - Reruns over existing outputs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use audiorip_core::{
    testing::{fixtures, MockProcessRunner, MockResponse},
    AppState, BatchConfig, BatchConverter, BatchHandle, BatchResult, ConverterConfig,
    FailureKind, FfmpegConverter, SessionConfig, SessionError, StatusUpdate, UserInputError,
};

/// Test helper holding a session wired to a stubbed ffmpeg.
struct TestHarness {
    state: AppState,
    runner: MockProcessRunner,
    input_dir: TempDir,
    output_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let input_dir = TempDir::new().expect("Failed to create input dir");
        let output_dir = TempDir::new().expect("Failed to create output dir");
        let runner = MockProcessRunner::new();
        runner.set_default(MockResponse::converted());

        Self {
            state: AppState::new(SessionConfig::default()),
            runner,
            input_dir,
            output_dir,
        }
    }

    fn select(&mut self, names: &[&str]) -> Vec<PathBuf> {
        let files = fixtures::input_files(self.input_dir.path(), names);
        self.state.select_files(files.clone()).unwrap();
        self.state.select_output_dir(self.output_dir.path()).unwrap();
        files
    }

    fn batch(&self, config: &BatchConfig) -> BatchConverter<FfmpegConverter> {
        let converter =
            FfmpegConverter::with_runner(ConverterConfig::default(), Arc::new(self.runner.clone()));
        BatchConverter::from_config(Arc::new(converter), config)
    }

    fn output(&self, name: &str) -> PathBuf {
        self.output_dir.path().join(name)
    }
}

/// Poll the handle the way a foreground loop would.
fn poll_to_completion(mut handle: BatchHandle) -> (Vec<StatusUpdate>, BatchResult) {
    let mut updates = Vec::new();
    loop {
        updates.extend(handle.drain_status());
        if handle.is_finished() {
            updates.extend(handle.drain_status());
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    let result = handle.wait().expect("Batch worker failed");
    (updates, result)
}

#[test]
fn test_mixed_batch_reports_each_file() {
    let mut harness = TestHarness::new();
    let files = harness.select(&["input1.ext", "input2.ext", "input3.ext"]);
    harness
        .runner
        .respond_for(&files[1], MockResponse::exit(1, "", "unsupported codec"));

    let handle = harness
        .state
        .start_batch(harness.batch(&BatchConfig::default()))
        .unwrap();
    let (updates, result) = poll_to_completion(handle);

    assert_eq!(result.total, 3);
    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].input_path, files[1]);
    assert_eq!(result.failures[0].error_detail, "unsupported codec");
    assert_eq!(
        result.outcomes[1].failure_kind,
        Some(FailureKind::ToolExecutionFailure)
    );

    assert_eq!(updates.len(), 3);
    assert_eq!(updates.iter().filter(|u| !u.succeeded).count(), 1);
    assert!(updates.iter().all(|u| u.total == 3));

    assert!(harness.output("input1.mp3").exists());
    assert!(!harness.output("input2.mp3").exists());
    assert!(harness.output("input3.mp3").exists());

    let summary = result.summary(5).to_string();
    assert!(summary.starts_with("Converted 2/3 files"));
    assert!(summary.contains("• input2.ext: unsupported codec"));
    assert!(!harness.state.is_converting());
}

#[test]
fn test_spawn_failure_is_isolated() {
    let mut harness = TestHarness::new();
    let files = harness.select(&["a.mp4", "b.mp4"]);
    harness.runner.respond_for(
        &files[0],
        MockResponse::spawn_error(std::io::ErrorKind::PermissionDenied, "Test error"),
    );

    let handle = harness
        .state
        .start_batch(harness.batch(&BatchConfig::default()))
        .unwrap();
    let (_, result) = poll_to_completion(handle);

    assert_eq!(result.succeeded, 1);
    assert_eq!(result.failures[0].error_detail, "Test error");
    assert_eq!(
        result.outcomes[0].failure_kind,
        Some(FailureKind::SpawnFailure)
    );
    assert!(harness.output("b.mp3").exists());
}

#[test]
fn test_summary_truncates_many_failures() {
    let mut harness = TestHarness::new();
    let names: Vec<String> = (1..=8).map(|i| format!("clip{}.mp4", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    harness.select(&refs);
    harness
        .runner
        .set_default(MockResponse::exit(1, "", "Invalid data found when processing input"));

    let config = BatchConfig::default();
    let handle = harness.state.start_batch(harness.batch(&config)).unwrap();
    let (_, result) = poll_to_completion(handle);

    assert_eq!(result.succeeded, 0);
    assert_eq!(result.failures.len(), 8);

    let summary = result.summary(config.failure_detail_limit);
    assert_eq!(summary.shown.len(), 5);
    assert_eq!(summary.omitted, 3);
    assert!(summary.to_string().ends_with("...and 3 more"));
}

#[test]
fn test_rerun_replaces_outputs() {
    let mut harness = TestHarness::new();
    harness.select(&["song.mp4"]);
    std::fs::write(harness.output("song.mp3"), b"old").unwrap();

    let handle = harness
        .state
        .start_batch(harness.batch(&BatchConfig::default()))
        .unwrap();
    let (_, result) = poll_to_completion(handle);

    assert!(result.all_succeeded());
    let calls = harness.runner.calls();
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].output_existed);
    assert_ne!(std::fs::read(harness.output("song.mp3")).unwrap(), b"old");
}

#[test]
fn test_limited_concurrency_completes_everything() {
    let mut harness = TestHarness::new();
    harness.select(&["1.mp4", "2.mp4", "3.mp4", "4.mp4"]);
    harness.runner.set_delay(Duration::from_millis(20));

    let config = BatchConfig {
        max_concurrent: 1,
        ..Default::default()
    };
    let handle = harness.state.start_batch(harness.batch(&config)).unwrap();
    let (updates, result) = poll_to_completion(handle);

    assert_eq!(result.succeeded, 4);
    assert_eq!(harness.runner.max_in_flight(), 1);
    assert_eq!(
        updates.iter().map(|u| u.completed).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
}

#[test]
fn test_second_start_rejected_while_running() {
    let mut harness = TestHarness::new();
    harness.select(&["long.mp4"]);
    harness.runner.set_delay(Duration::from_millis(100));

    let handle = harness
        .state
        .start_batch(harness.batch(&BatchConfig::default()))
        .unwrap();

    let second = harness.state.start_batch(harness.batch(&BatchConfig::default()));
    assert!(matches!(
        second,
        Err(SessionError::Input(UserInputError::Busy))
    ));

    let (_, result) = poll_to_completion(handle);
    assert_eq!(result.total, 1);
    assert_eq!(harness.runner.call_count(), 1);
}

#[test]
fn test_preflight_rejection_spawns_nothing() {
    let mut harness = TestHarness::new();
    let files = fixtures::input_files(harness.input_dir.path(), &["a.mp4"]);
    harness.state.select_files(files).unwrap();

    let result = harness
        .state
        .start_batch(harness.batch(&BatchConfig::default()));

    assert!(matches!(
        result,
        Err(SessionError::Input(UserInputError::NoOutputDirectory))
    ));
    assert_eq!(harness.runner.call_count(), 0);
    assert!(!harness.state.is_converting());
}

#[test]
fn test_mp3_input_in_output_dir_is_left_alone() {
    let mut harness = TestHarness::new();
    let song = harness.output("song.mp3");
    std::fs::write(&song, b"user audio").unwrap();
    harness.state.select_files([&song]).unwrap();
    harness
        .state
        .select_output_dir(harness.output_dir.path())
        .unwrap();

    let result = harness
        .state
        .start_batch(harness.batch(&BatchConfig::default()));

    assert!(matches!(
        result,
        Err(SessionError::Input(UserInputError::InputIsOutput { .. }))
    ));
    assert_eq!(harness.runner.call_count(), 0);
    assert_eq!(std::fs::read(&song).unwrap(), b"user audio");
}
