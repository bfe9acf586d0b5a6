//! Batch session management.
//!
//! [`AppState`] owns the user's selections, rejects bad input before any
//! process starts, and runs at most one batch at a time on a background
//! thread. The foreground polls the returned [`BatchHandle`] for progress.

mod config;
mod error;
mod opener;
mod state;
mod worker;

pub use config::SessionConfig;
pub use error::{SessionError, UserInputError};
pub use opener::{file_browser, open_directory};
pub use state::AppState;
pub use worker::BatchHandle;
