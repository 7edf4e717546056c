//! # batch-select
//!
//! Cancellable batch-selection coordinator for UI-facing applications.
//!
//! Applying an action to tens of thousands of items (selecting every photo in a gallery,
//! marking every message as read) in one go freezes the foreground. batch-select runs the
//! action in fixed-size batches scheduled from a background task, hands each batch to the
//! foreground context and waits for it, pauses between batches, and lets the caller cancel
//! at any point without corrupting state.
//!
//! ## Design Philosophy
//!
//! - **Caller decides what selecting means** - the coordinator only applies a handler
//! - **Foreground affinity** - handlers always run on one serialized context
//! - **Event-driven** - progress is a stream of states, no polling required
//! - **One campaign at a time** - starting a new one supersedes the old one
//!
//! ## Quick Start
//!
//! ```no_run
//! use batch_select::{SelectionCoordinator, SelectionState};
//! use batch_select::foreground::ForegroundQueue;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (foreground, _ui_thread) = ForegroundQueue::spawn_dedicated("ui")?;
//!     let coordinator = SelectionCoordinator::new(200, Duration::from_millis(10), foreground);
//!
//!     // Subscribe to progress
//!     let mut states = coordinator.subscribe();
//!     tokio::spawn(async move {
//!         while let Some(state) = states.recv().await {
//!             println!("State: {}", state);
//!         }
//!     });
//!
//!     let ids: Vec<u64> = (0..50_000).collect();
//!     coordinator.start(ids, |id| {
//!         // select the item on the UI thread
//!         let _ = id;
//!     });
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Batch-selection coordinator
pub mod coordinator;
/// Error types
pub mod error;
/// Foreground execution context
pub mod foreground;
/// Latest-value state broadcasting
pub mod publisher;
/// Core state and progress types
pub mod types;

// Re-export commonly used types
pub use config::CoordinatorConfig;
pub use coordinator::SelectionCoordinator;
pub use error::{Error, Result};
pub use foreground::{ForegroundExecutor, ForegroundQueue, ForegroundReceiver};
pub use publisher::{StatePublisher, StateStream};
pub use types::{Progress, SelectionState};
