//! Error types for the session module.

use std::path::PathBuf;
use thiserror::Error;

/// Problems with the user's selections, rejected before any process starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserInputError {
    /// No input file has been selected.
    #[error("No input files selected")]
    NoFilesSelected,

    /// No output directory has been selected.
    #[error("No output directory selected")]
    NoOutputDirectory,

    /// The output directory is gone.
    #[error("Output directory does not exist: {path}")]
    OutputDirectoryMissing { path: PathBuf },

    /// The selected output path is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// An input has no file name to derive an output from.
    #[error("Input path has no file name: {path}")]
    InvalidInputPath { path: PathBuf },

    /// Two inputs map onto the same output file.
    #[error("{first} and {second} would both be written to {output}")]
    DuplicateOutput {
        first: PathBuf,
        second: PathBuf,
        output: PathBuf,
    },

    /// An input would be overwritten by its own output.
    #[error("{path} would be overwritten by its own output")]
    InputIsOutput { path: PathBuf },

    /// A batch is already running.
    #[error("A conversion is already in progress")]
    Busy,
}

/// Errors from driving a batch session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The selections were rejected.
    #[error(transparent)]
    Input(#[from] UserInputError),

    /// The background thread could not be started.
    #[error("Failed to start batch worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The background runtime could not be built.
    #[error("Failed to build batch runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// The background thread panicked.
    #[error("Batch worker panicked")]
    WorkerPanicked,

    /// The file browser could not be launched.
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
