//! Channel-backed foreground queue

use std::panic::{AssertUnwindSafe, catch_unwind};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::traits::{ForegroundExecutor, ForegroundJob};
use crate::error::{Error, Result};

/// A job paired with its completion signal
struct Envelope {
    job: ForegroundJob,
    done: oneshot::Sender<()>,
}

/// Sending half of a serialized foreground queue
///
/// Cloning is cheap; all clones feed the same [`ForegroundReceiver`].
///
/// # Examples
///
/// ```no_run
/// use batch_select::foreground::{ForegroundExecutor, ForegroundQueue};
///
/// # async fn example() -> batch_select::Result<()> {
/// let (queue, thread) = ForegroundQueue::spawn_dedicated("ui")?;
///
/// queue.execute(Box::new(|| println!("on the ui thread"))).await?;
///
/// drop(queue);
/// thread.join().ok();
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ForegroundQueue {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl ForegroundQueue {
    /// Create a queue and the receiver the host drives on its foreground context
    pub fn channel() -> (ForegroundQueue, ForegroundReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ForegroundQueue { tx }, ForegroundReceiver { rx })
    }

    /// Create a queue served by a newly spawned, named OS thread
    ///
    /// The thread exits once every clone of the returned queue has been dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the thread cannot be spawned.
    pub fn spawn_dedicated(
        name: impl Into<String>,
    ) -> Result<(ForegroundQueue, std::thread::JoinHandle<()>)> {
        let name = name.into();
        let (queue, receiver) = Self::channel();
        let handle = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || receiver.run_blocking())?;
        tracing::debug!(thread = %name, "Spawned dedicated foreground thread");
        Ok((queue, handle))
    }

    /// Returns true once the receiver has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl ForegroundExecutor for ForegroundQueue {
    async fn execute(&self, job: ForegroundJob) -> Result<()> {
        let (done, completed) = oneshot::channel();
        self.tx
            .send(Envelope { job, done })
            .map_err(|_| Error::ForegroundClosed)?;
        completed.await.map_err(|_| Error::ForegroundJobFailed)
    }
}

/// Receiving half of a [`ForegroundQueue`]
///
/// Exactly one receiver exists per queue, so jobs always run one at a time in the
/// order they were submitted. Pick the driving style that matches the host:
/// [`run_blocking`](Self::run_blocking) on a thread it owns, [`run`](Self::run) as a task,
/// or [`drain`](Self::drain) once per frame of an existing loop.
#[derive(Debug)]
pub struct ForegroundReceiver {
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl ForegroundReceiver {
    /// Serve jobs on the current thread until every queue handle is dropped
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn run_blocking(mut self) {
        while let Some(envelope) = self.rx.blocking_recv() {
            run_envelope(envelope);
        }
        tracing::debug!("Foreground receiver stopped");
    }

    /// Serve jobs on the current task until every queue handle is dropped
    pub async fn run(mut self) {
        while let Some(envelope) = self.rx.recv().await {
            run_envelope(envelope);
        }
        tracing::debug!("Foreground receiver stopped");
    }

    /// Run every job queued right now without waiting, returning how many ran
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(envelope) = self.rx.try_recv() {
            run_envelope(envelope);
            ran += 1;
        }
        ran
    }
}

fn run_envelope(envelope: Envelope) {
    let Envelope { job, done } = envelope;
    match catch_unwind(AssertUnwindSafe(job)) {
        Ok(()) => {
            // The submitter may have stopped waiting
            done.send(()).ok();
        }
        Err(_) => {
            // Dropping `done` reports the failure to the submitter
            tracing::error!("Foreground job panicked");
        }
    }
}
