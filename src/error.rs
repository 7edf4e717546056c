//! Error types for batch-select
//!
//! Campaign outcomes never surface as errors: a foreground failure during a campaign is
//! published as [`SelectionState::Cancelled`](crate::SelectionState::Cancelled). These
//! errors come from construction and from the foreground queue itself.

use thiserror::Error;

/// Result type alias for batch-select operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for batch-select
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "batch_size")
        key: Option<String>,
    },

    /// The foreground receiver was dropped, no job can be delivered
    #[error("foreground queue closed")]
    ForegroundClosed,

    /// A job reached the foreground but was dropped before signalling completion
    #[error("foreground job did not complete")]
    ForegroundJobFailed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
