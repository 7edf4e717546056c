//! Trait for the foreground execution context

use async_trait::async_trait;

/// Unit of work handed to the foreground context
pub type ForegroundJob = Box<dyn FnOnce() + Send + 'static>;

/// A serialized execution context on which selection handlers run
///
/// The coordinator hands each batch to the foreground as a single job and waits for it
/// to finish before scheduling the next one. Implementations must run jobs one at a time,
/// in submission order, on the context the host considers safe for UI-visible effects.
///
/// [`ForegroundQueue`](super::ForegroundQueue) is the provided implementation. Hosts with
/// their own main loop can implement this trait to post jobs into it directly.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use batch_select::foreground::{ForegroundExecutor, ForegroundJob};
///
/// /// Runs jobs inline on whichever task awaits them
/// struct Inline;
///
/// #[async_trait]
/// impl ForegroundExecutor for Inline {
///     async fn execute(&self, job: ForegroundJob) -> batch_select::Result<()> {
///         job();
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait ForegroundExecutor: Send + Sync {
    /// Run `job` on the foreground context and resolve once it has returned
    ///
    /// # Errors
    ///
    /// Returns an error if the foreground can no longer accept work or the job was
    /// dropped without completing. The coordinator treats either as cancellation.
    async fn execute(&self, job: ForegroundJob) -> crate::Result<()>;
}
