//! Mock process runner for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::converter::{ProcessOutput, ProcessRunner};

/// Scripted behavior for one process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// The process runs and exits with `code`.
    Exit {
        code: i32,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
        /// Create the file named by the last argument before "exiting".
        write_output: bool,
    },
    /// Launching the process fails.
    SpawnError {
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl MockResponse {
    /// A process exiting with `code` and the given output streams.
    pub fn exit(code: i32, stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self::Exit {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            write_output: false,
        }
    }

    /// A successful conversion: exit zero and the output file appears.
    pub fn converted() -> Self {
        Self::exit(0, "", "").with_output()
    }

    /// A launch failure of the given kind.
    pub fn spawn_error(kind: std::io::ErrorKind, message: impl Into<String>) -> Self {
        Self::SpawnError {
            kind,
            message: message.into(),
        }
    }

    /// Makes an `Exit` response create its output file.
    pub fn with_output(self) -> Self {
        match self {
            Self::Exit {
                code,
                stdout,
                stderr,
                ..
            } => Self::Exit {
                code,
                stdout,
                stderr,
                write_output: true,
            },
            other => other,
        }
    }
}

impl Default for MockResponse {
    fn default() -> Self {
        Self::exit(0, "", "")
    }
}

/// A recorded process launch for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Program that was launched.
    pub program: PathBuf,
    /// Arguments it received.
    pub args: Vec<OsString>,
    /// Timeout it was launched with.
    pub timeout: Option<Duration>,
    /// Whether the last argument named an existing file at launch time.
    pub output_existed: bool,
}

impl RecordedCall {
    /// The value following `-i`, if any.
    pub fn input(&self) -> Option<PathBuf> {
        self.args
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| self.args.get(i + 1))
            .map(PathBuf::from)
    }
}

#[derive(Debug, Default)]
struct MockState {
    queued: VecDeque<MockResponse>,
    by_input: HashMap<PathBuf, MockResponse>,
    default_response: MockResponse,
    calls: Vec<RecordedCall>,
    delay: Duration,
}

/// Mock implementation of the [`ProcessRunner`] trait.
///
/// Responses are picked in this order: a response registered for the call's
/// `-i` input, then the next queued response, then the default response
/// (exit zero, no output file).
///
/// # Example
///
/// ```rust,ignore
/// use audiorip_core::testing::{MockProcessRunner, MockResponse};
///
/// let runner = MockProcessRunner::new();
/// runner.respond_for("input2.mp4", MockResponse::exit(1, "", "unsupported codec"));
/// runner.set_default(MockResponse::converted());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockProcessRunner {
    state: Arc<Mutex<MockState>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockProcessRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a response for the next unmatched launch.
    pub fn push(&self, response: MockResponse) {
        self.state().queued.push_back(response);
    }

    /// Respond to every launch whose `-i` argument is `input`.
    pub fn respond_for(&self, input: impl AsRef<Path>, response: MockResponse) {
        self.state()
            .by_input
            .insert(input.as_ref().to_path_buf(), response);
    }

    /// Set the response used when nothing else matches.
    pub fn set_default(&self, response: MockResponse) {
        self.state().default_response = response;
    }

    /// Simulated run time of every launch.
    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = delay;
    }

    /// All launches so far, in launch order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    /// Number of launches so far.
    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    /// Highest number of launches that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[OsString],
        timeout: Option<Duration>,
    ) -> std::io::Result<ProcessOutput> {
        let output_path = args.last().map(PathBuf::from);
        let call = RecordedCall {
            program: program.to_path_buf(),
            args: args.to_vec(),
            timeout,
            output_existed: output_path.as_deref().is_some_and(Path::exists),
        };

        let (response, delay) = {
            let mut state = self.state();
            let response = call
                .input()
                .and_then(|input| state.by_input.get(&input).cloned())
                .or_else(|| state.queued.pop_front())
                .unwrap_or_else(|| state.default_response.clone());
            state.calls.push(call);
            (response, state.delay)
        };

        let (code, stdout, stderr, write_output) = match response {
            MockResponse::SpawnError { kind, message } => {
                return Err(std::io::Error::new(kind, message));
            }
            MockResponse::Exit {
                code,
                stdout,
                stderr,
                write_output,
            } => (code, stdout, stderr, write_output),
        };

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if write_output {
            if let Some(path) = output_path {
                tokio::fs::write(&path, b"ID3 mock audio").await?;
            }
        }

        Ok(ProcessOutput {
            exit_code: Some(code),
            stdout,
            stderr,
        })
    }
}
