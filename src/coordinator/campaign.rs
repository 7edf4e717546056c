//! Batch-scheduling loop for a single campaign

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::Shared;
use crate::foreground::{ForegroundExecutor, ForegroundJob};
use crate::types::SelectionState;

/// How a campaign's loop ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Finished,
    Cancelled,
}

/// One in-flight campaign, owned by its background task
pub(super) struct Campaign<T, F> {
    /// Campaign number, used to fence publications from superseded loops
    pub id: u64,
    /// Item snapshot, immutable for the campaign's lifetime
    pub items: Arc<[T]>,
    pub handler: Arc<F>,
    pub batch_size: usize,
    pub pause: Duration,
    pub cancel_token: CancellationToken,
    pub foreground: Arc<dyn ForegroundExecutor>,
    pub shared: Arc<Shared>,
}

impl<T, F> Campaign<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    /// Drive the campaign to its terminal state and publish it
    pub(super) async fn run(self) {
        let total = self.items.len();
        let terminal = match self.process_batches().await {
            Outcome::Finished => SelectionState::Finished,
            Outcome::Cancelled => SelectionState::Cancelled,
        };

        if self.shared.publish_if_current(self.id, terminal) {
            info!(campaign = self.id, total, state = %terminal, "Selection campaign ended");
        } else {
            debug!(
                campaign = self.id,
                state = %terminal,
                "Selection campaign ended after being superseded, state not published"
            );
        }
    }

    async fn process_batches(&self) -> Outcome {
        let total = self.items.len();
        let mut index = 0;

        while index < total {
            if self.cancel_token.is_cancelled() {
                debug!(campaign = self.id, selected = index, total, "Cancellation observed");
                return Outcome::Cancelled;
            }

            let upper = (index + self.batch_size).min(total);
            if let Err(e) = self.foreground.execute(self.batch_job(index, upper)).await {
                warn!(
                    campaign = self.id,
                    selected = index,
                    error = %e,
                    "Foreground rejected batch, cancelling campaign"
                );
                return Outcome::Cancelled;
            }
            index = upper;

            debug!(campaign = self.id, selected = index, total, "Batch applied");
            self.shared.publish_if_current(
                self.id,
                SelectionState::InProgress {
                    selected: index,
                    total,
                },
            );

            if index < total && !self.pause.is_zero() {
                tokio::select! {
                    _ = self.cancel_token.cancelled() => {
                        debug!(
                            campaign = self.id,
                            selected = index,
                            total,
                            "Cancelled during pause"
                        );
                        return Outcome::Cancelled;
                    }
                    _ = tokio::time::sleep(self.pause) => {}
                }
            }
        }

        Outcome::Finished
    }

    /// Foreground job applying the handler to `items[start..end]` in order
    fn batch_job(&self, start: usize, end: usize) -> ForegroundJob {
        let items = Arc::clone(&self.items);
        let handler = Arc::clone(&self.handler);
        Box::new(move || {
            for item in &items[start..end] {
                (*handler)(item);
            }
        })
    }
}
