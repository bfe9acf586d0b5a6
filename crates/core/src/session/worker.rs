//! Background batch worker.
//!
//! A batch runs on its own OS thread with a single-threaded tokio runtime.
//! The only link back to the caller is an unbounded channel of
//! [`StatusUpdate`]s and the thread's join handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::batch::{BatchConverter, BatchResult, StatusUpdate};
use crate::converter::{ConversionRequest, Converter};

use super::error::SessionError;

const WORKER_THREAD_NAME: &str = "audiorip-batch";

/// Clears the busy flag when the worker ends, panics included.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Handle to a batch running in the background.
pub struct BatchHandle {
    status_rx: mpsc::UnboundedReceiver<StatusUpdate>,
    join: JoinHandle<Result<BatchResult, SessionError>>,
    total: usize,
}

impl BatchHandle {
    /// Number of files in the batch.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Takes every status update received so far without blocking.
    pub fn drain_status(&mut self) -> Vec<StatusUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = self.status_rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Blocks until the batch is done and returns its result.
    pub fn wait(self) -> Result<BatchResult, SessionError> {
        self.join.join().map_err(|_| SessionError::WorkerPanicked)?
    }
}

/// Starts `requests` on a new worker thread.
///
/// `busy` must already be set by the caller; it is cleared when the worker
/// exits, or right away if the thread cannot be started.
pub(crate) fn spawn_batch<C>(
    batch: BatchConverter<C>,
    requests: Vec<ConversionRequest>,
    busy: Arc<AtomicBool>,
) -> Result<BatchHandle, SessionError>
where
    C: Converter + 'static,
{
    let (status_tx, status_rx) = mpsc::unbounded_channel();
    let total = requests.len();
    let guard = BusyGuard(busy);

    let join = std::thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || {
            let _guard = guard;
            debug!(total, "Batch worker started");

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| {
                    error!("Failed to build batch runtime: {}", e);
                    SessionError::Runtime(e)
                })?;

            Ok(runtime.block_on(batch.convert_all(&requests, Some(status_tx))))
        })
        .map_err(SessionError::WorkerSpawn)?;

    Ok(BatchHandle {
        status_rx,
        join,
        total,
    })
}
