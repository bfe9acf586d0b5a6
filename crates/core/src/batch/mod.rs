//! Batch module for converting many files at once.
//!
//! This module provides the `BatchConverter`, which fans out one conversion
//! per request, runs them concurrently and folds the outcomes into a
//! `BatchResult`. Individual failures never abort the batch.
//!
//! # Example
//!
//! ```ignore
//! use audiorip_core::batch::BatchConverter;
//! use audiorip_core::converter::FfmpegConverter;
//!
//! let batch = BatchConverter::new(FfmpegConverter::with_defaults());
//!
//! let (status_tx, mut status_rx) = tokio::sync::mpsc::unbounded_channel();
//! let result = batch.convert_all(&requests, Some(status_tx)).await;
//!
//! while let Ok(update) = status_rx.try_recv() {
//!     println!("{}", update);
//! }
//! println!("{}", result.summary(5));
//! ```

mod config;
mod converter;
mod types;

pub use config::BatchConfig;
pub use converter::BatchConverter;
pub use types::{BatchResult, BatchSummary, FailureDetail, StatusUpdate, DEFAULT_FAILURE_DETAIL_LIMIT};
