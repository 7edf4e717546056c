//! Foreground execution context
//!
//! Selection handlers must run on a single serialized context (typically the UI thread).
//! The coordinator talks to it through [`ForegroundExecutor`]; [`ForegroundQueue`] is a
//! channel-based implementation the host drives with a [`ForegroundReceiver`].

mod queue;
mod traits;

pub use queue::{ForegroundQueue, ForegroundReceiver};
pub use traits::{ForegroundExecutor, ForegroundJob};
