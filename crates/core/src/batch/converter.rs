//! Batch converter implementation.

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::converter::{ConversionOutcome, ConversionRequest, Converter};
use crate::metrics;

use super::config::BatchConfig;
use super::types::{BatchResult, StatusUpdate};

/// Runs one conversion per request concurrently and aggregates the outcomes.
///
/// By default every request gets its own ffmpeg process right away. A
/// concurrency limit can be set, which queues the remaining requests without
/// changing what [`convert_all`](Self::convert_all) returns.
pub struct BatchConverter<C: Converter> {
    converter: Arc<C>,
    limit: Option<Arc<Semaphore>>,
}

impl<C: Converter> Clone for BatchConverter<C> {
    fn clone(&self) -> Self {
        Self {
            converter: Arc::clone(&self.converter),
            limit: self.limit.clone(),
        }
    }
}

impl<C: Converter> BatchConverter<C> {
    /// Creates an unbounded batch converter.
    pub fn new(converter: C) -> Self {
        Self::from_arc(Arc::new(converter))
    }

    /// Creates an unbounded batch converter sharing `converter`.
    pub fn from_arc(converter: Arc<C>) -> Self {
        Self {
            converter,
            limit: None,
        }
    }

    /// Creates a batch converter honoring the configured limit.
    pub fn from_config(converter: Arc<C>, config: &BatchConfig) -> Self {
        Self::from_arc(converter).with_max_concurrent(config.concurrency_limit())
    }

    /// Caps the number of simultaneous conversions; `None` removes the cap.
    pub fn with_max_concurrent(mut self, max: Option<usize>) -> Self {
        self.limit = max.map(|n| Arc::new(Semaphore::new(n.max(1))));
        self
    }

    /// Returns the underlying converter.
    pub fn converter(&self) -> &Arc<C> {
        &self.converter
    }

    /// Converts every request and waits for all of them.
    ///
    /// A failing file never stops its siblings. When `status_tx` is given, a
    /// [`StatusUpdate`] is sent as each file finishes; the returned result lists
    /// outcomes in request order regardless of completion order.
    pub async fn convert_all(
        &self,
        requests: &[ConversionRequest],
        status_tx: Option<mpsc::UnboundedSender<StatusUpdate>>,
    ) -> BatchResult {
        let batch_id = Uuid::new_v4();
        let started_at = Utc::now();
        let total = requests.len();

        if total == 0 {
            warn!(%batch_id, "Batch started without requests");
        }
        info!(
            %batch_id,
            total,
            converter = self.converter.name(),
            "Starting batch"
        );
        metrics::BATCHES_TOTAL.inc();
        metrics::BATCH_SIZE.observe(total as f64);

        let converter = self.converter.as_ref();
        let limit = self.limit.as_deref();

        let mut pending: FuturesUnordered<_> = requests
            .iter()
            .enumerate()
            .map(|(index, request)| async move {
                let _permit = match limit {
                    Some(semaphore) => semaphore.acquire().await.ok(),
                    None => None,
                };

                metrics::CONVERSIONS_IN_FLIGHT.inc();
                let outcome = converter.convert(request).await;
                metrics::CONVERSIONS_IN_FLIGHT.dec();

                (index, outcome)
            })
            .collect();

        let mut slots: Vec<Option<ConversionOutcome>> = vec![None; total];
        let mut completed = 0;

        while let Some((index, outcome)) = pending.next().await {
            completed += 1;
            metrics::record_conversion(outcome.result_label(), outcome.duration_ms);
            debug!(
                %batch_id,
                index,
                completed,
                total,
                input = ?outcome.input_path,
                succeeded = outcome.succeeded,
                "File finished"
            );

            if let Some(tx) = &status_tx {
                let update = StatusUpdate {
                    index,
                    completed,
                    total,
                    input_path: outcome.input_path.clone(),
                    succeeded: outcome.succeeded,
                };
                // The receiver may be gone; the batch still runs to completion.
                let _ = tx.send(update);
            }

            slots[index] = Some(outcome);
        }

        let outcomes: Vec<ConversionOutcome> = slots.into_iter().flatten().collect();
        let result = BatchResult::from_outcomes(batch_id, outcomes, started_at, Utc::now());

        info!(
            %batch_id,
            total = result.total,
            succeeded = result.succeeded,
            failed = result.failed(),
            duration_ms = result.duration_ms(),
            "Batch finished"
        );

        result
    }
}
