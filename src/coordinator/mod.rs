//! Cancellable batch-selection coordinator
//!
//! [`SelectionCoordinator`] applies a caller-supplied handler to every item of a list,
//! a fixed-size batch at a time. Batches are scheduled from a background Tokio task and
//! executed on the foreground context, with an optional pause between them so a very
//! large list cannot starve foreground work. Progress is published as
//! [`SelectionState`] values that any number of observers can subscribe to.
//!
//! # Campaign lifecycle
//!
//! ```text
//! start ─▶ InProgress(0, N) ─▶ InProgress(B, N) ─▶ … ─▶ InProgress(N, N) ─▶ Finished
//!                  │                   │
//!                  └──── cancel ───────┴──────────────▶ Cancelled
//! ```
//!
//! Only one campaign runs per coordinator. Starting another one cancels the running
//! campaign, publishes `Cancelled` for it, and fences its loop so none of its later
//! transitions reach subscribers.

mod campaign;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::CoordinatorConfig;
use crate::error::Result;
use crate::foreground::ForegroundExecutor;
use crate::publisher::{StatePublisher, StateStream};
use crate::types::{Progress, SelectionState};

use campaign::Campaign;

/// Handle to the in-flight campaign
#[derive(Debug)]
struct RunHandle {
    campaign: u64,
    cancel_token: CancellationToken,
    total: usize,
}

/// Mutable coordinator state, guarded together with every publication
#[derive(Debug, Default)]
struct Control {
    active: Option<RunHandle>,
    next_campaign: u64,
}

/// State shared between the public API and background loops
#[derive(Debug, Default)]
pub(crate) struct Shared {
    control: Mutex<Control>,
    publisher: StatePublisher,
}

impl Shared {
    fn lock_control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish `state` on behalf of `campaign` if it is still the active one
    ///
    /// A terminal state also releases the run handle. Returns whether the state was
    /// published.
    pub(crate) fn publish_if_current(&self, campaign: u64, state: SelectionState) -> bool {
        let mut control = self.lock_control();
        match &control.active {
            Some(run) if run.campaign == campaign => {
                self.publisher.publish(state);
                if state.is_terminal() {
                    control.active = None;
                }
                true
            }
            _ => false,
        }
    }
}

/// Applies a handler to large item lists in cancellable, paced batches
///
/// All operations are synchronous and may be called from any thread; they serialize
/// against each other and against the background loop. [`start`](Self::start) spawns
/// onto the current Tokio runtime.
///
/// # Examples
///
/// ```no_run
/// use batch_select::{SelectionCoordinator, SelectionState};
/// use batch_select::foreground::ForegroundQueue;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> batch_select::Result<()> {
/// let (foreground, _ui_thread) = ForegroundQueue::spawn_dedicated("ui")?;
/// let coordinator = SelectionCoordinator::new(500, Duration::from_millis(10), foreground);
///
/// let mut states = coordinator.subscribe();
/// coordinator.start((0..20_000u32).collect::<Vec<_>>(), |photo_id: &u32| {
///     // mark the photo as selected
///     let _ = photo_id;
/// });
///
/// while let Some(state) = states.recv().await {
///     if let Some(progress) = state.progress() {
///         println!("{:.0}%", progress.fraction_completed() * 100.0);
///     }
///     if state.is_terminal() {
///         break;
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct SelectionCoordinator {
    batch_size: usize,
    pause: Duration,
    foreground: Arc<dyn ForegroundExecutor>,
    shared: Arc<Shared>,
}

impl SelectionCoordinator {
    /// Create a coordinator in the `Idle` state
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Items handed to the foreground per dispatch
    /// * `pause` - Delay between batches, `Duration::ZERO` disables it
    /// * `foreground` - Context on which the handler runs
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is zero. Use [`from_config`](Self::from_config) to get an
    /// error instead.
    pub fn new<E>(batch_size: usize, pause: Duration, foreground: E) -> Self
    where
        E: ForegroundExecutor + 'static,
    {
        assert!(batch_size > 0, "batch_size must be greater than zero");
        Self {
            batch_size,
            pause,
            foreground: Arc::new(foreground),
            shared: Arc::new(Shared::default()),
        }
    }

    /// Create a coordinator from a validated [`CoordinatorConfig`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the configuration is invalid.
    pub fn from_config<E>(config: &CoordinatorConfig, foreground: E) -> Result<Self>
    where
        E: ForegroundExecutor + 'static,
    {
        config.validate()?;
        Ok(Self::new(config.batch_size, config.pause, foreground))
    }

    /// Start a campaign applying `handler` to every item, in order
    ///
    /// Any running campaign is cancelled first and `Cancelled` is published for it. An
    /// empty list publishes `Finished` immediately without touching the foreground.
    /// Otherwise `InProgress(0, N)` is published and the batches are scheduled in the
    /// background; the outcome surfaces only through the state stream.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime with a non-empty list. The check happens
    /// before anything is cancelled or published, so the coordinator is left untouched.
    pub fn start<I, T, F>(&self, items: I, handler: F)
    where
        I: IntoIterator<Item = T>,
        T: Send + Sync + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let items: Arc<[T]> = items.into_iter().collect();
        let total = items.len();

        let runtime = if total == 0 {
            None
        } else {
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => Some(runtime),
                Err(e) => panic!("SelectionCoordinator::start requires a Tokio runtime: {e}"),
            }
        };

        let mut control = self.shared.lock_control();
        if let Some(previous) = control.active.take() {
            previous.cancel_token.cancel();
            info!(
                campaign = previous.campaign,
                total = previous.total,
                "Superseding running selection campaign"
            );
            self.shared.publisher.publish(SelectionState::Cancelled);
        }

        let id = control.next_campaign;
        control.next_campaign += 1;

        let Some(runtime) = runtime else {
            debug!(campaign = id, "Empty selection, finished immediately");
            self.shared.publisher.publish(SelectionState::Finished);
            return;
        };

        let cancel_token = CancellationToken::new();
        control.active = Some(RunHandle {
            campaign: id,
            cancel_token: cancel_token.clone(),
            total,
        });
        self.shared
            .publisher
            .publish(SelectionState::InProgress { selected: 0, total });
        drop(control);

        info!(
            campaign = id,
            total,
            batch_size = self.batch_size,
            pause_ms = u64::try_from(self.pause.as_millis()).unwrap_or(u64::MAX),
            "Starting selection campaign"
        );

        let campaign = Campaign {
            id,
            items,
            handler: Arc::new(handler),
            batch_size: self.batch_size,
            pause: self.pause,
            cancel_token,
            foreground: Arc::clone(&self.foreground),
            shared: Arc::clone(&self.shared),
        };
        runtime.spawn(campaign.run());
    }

    /// Request cancellation of the running campaign
    ///
    /// Cooperative: the batch already on the foreground completes, no further batch
    /// starts, and `Cancelled` is published once the loop observes the request. A no-op
    /// when nothing is running or cancellation was already requested.
    pub fn cancel(&self) {
        let control = self.shared.lock_control();
        if let Some(run) = &control.active
            && !run.cancel_token.is_cancelled()
        {
            info!(campaign = run.campaign, "Cancelling selection campaign");
            run.cancel_token.cancel();
        }
    }

    /// Publish `Idle` regardless of the current state
    ///
    /// This does not cancel a running campaign: its loop keeps applying the handler and
    /// may publish `InProgress`, `Finished` or `Cancelled` after the reset. Call
    /// [`cancel_and_reset`](Self::cancel_and_reset) to stop the work as well.
    pub fn reset(&self) {
        let _control = self.shared.lock_control();
        self.shared.publisher.publish(SelectionState::Idle);
    }

    /// Cancel the running campaign and publish `Idle`
    ///
    /// The cancelled loop is detached, so nothing it does afterwards is published and
    /// `Idle` stays the current state until the next [`start`](Self::start).
    pub fn cancel_and_reset(&self) {
        let mut control = self.shared.lock_control();
        if let Some(run) = control.active.take() {
            info!(campaign = run.campaign, "Cancelling and resetting selection campaign");
            run.cancel_token.cancel();
        }
        self.shared.publisher.publish(SelectionState::Idle);
    }

    /// Stream of the current state followed by every future transition
    pub fn subscribe(&self) -> StateStream {
        self.shared.publisher.subscribe()
    }

    /// Current state
    pub fn state(&self) -> SelectionState {
        self.shared.publisher.current()
    }

    /// Progress of the running campaign, `None` unless the state is `InProgress`
    pub fn progress(&self) -> Option<Progress> {
        self.state().progress()
    }

    /// Returns true while a campaign has not reached its terminal state
    pub fn is_running(&self) -> bool {
        self.shared.lock_control().active.is_some()
    }

    /// Items handed to the foreground per dispatch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Delay between batches
    pub fn pause(&self) -> Duration {
        self.pause
    }
}

impl Drop for SelectionCoordinator {
    fn drop(&mut self) {
        if let Some(run) = &self.shared.lock_control().active {
            run.cancel_token.cancel();
        }
    }
}

impl std::fmt::Debug for SelectionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionCoordinator")
            .field("batch_size", &self.batch_size)
            .field("pause", &self.pause)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::foreground::{ForegroundJob, ForegroundQueue};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Runs jobs inline on the awaiting task
    struct Inline;

    #[async_trait]
    impl ForegroundExecutor for Inline {
        async fn execute(&self, job: ForegroundJob) -> Result<()> {
            job();
            Ok(())
        }
    }

    async fn next(stream: &mut StateStream) -> SelectionState {
        tokio::time::timeout(Duration::from_secs(5), stream.recv())
            .await
            .expect("timed out waiting for state")
            .expect("state stream closed")
    }

    #[test]
    #[should_panic(expected = "batch_size must be greater than zero")]
    fn test_zero_batch_size_panics() {
        let _ = SelectionCoordinator::new(0, Duration::ZERO, Inline);
    }

    #[test]
    fn test_from_config_rejects_zero_batch_size() {
        let config = CoordinatorConfig {
            batch_size: 0,
            pause: Duration::ZERO,
        };
        let result = SelectionCoordinator::from_config(&config, Inline);
        assert!(matches!(result, Err(crate::Error::Config { .. })));
    }

    #[test]
    fn test_from_config_applies_settings() {
        let config = CoordinatorConfig {
            batch_size: 7,
            pause: Duration::from_millis(3),
        };
        let coordinator = SelectionCoordinator::from_config(&config, Inline).unwrap();
        assert_eq!(coordinator.batch_size(), 7);
        assert_eq!(coordinator.pause(), Duration::from_millis(3));
    }

    #[test]
    fn test_initial_state_is_idle() {
        let coordinator = SelectionCoordinator::new(3, Duration::ZERO, Inline);
        assert_eq!(coordinator.state(), SelectionState::Idle);
        assert_eq!(coordinator.progress(), None);
        assert!(!coordinator.is_running());
    }

    #[test]
    fn test_empty_start_finishes_without_runtime() {
        let coordinator = SelectionCoordinator::new(3, Duration::ZERO, Inline);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        coordinator.start(Vec::<u32>::new(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(coordinator.state(), SelectionState::Finished);
        assert!(!coordinator.is_running());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_start_outside_runtime_leaves_state_untouched() {
        let coordinator = SelectionCoordinator::new(2, Duration::ZERO, Inline);
        let mut states = coordinator.subscribe();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            coordinator.start(vec![1, 2, 3], |_| {});
        }));
        assert!(result.is_err());

        assert_eq!(coordinator.state(), SelectionState::Idle);
        assert!(!coordinator.is_running());
        coordinator.cancel();
        assert_eq!(coordinator.state(), SelectionState::Idle);

        // Only the initial replay was ever delivered
        let mut recv = tokio_test::task::spawn(states.recv());
        assert_eq!(
            tokio_test::assert_ready!(recv.poll()),
            Some(SelectionState::Idle)
        );
        drop(recv);
        let mut recv = tokio_test::task::spawn(states.recv());
        tokio_test::assert_pending!(recv.poll());
    }

    #[tokio::test]
    async fn test_batches_publish_counts() {
        let coordinator = SelectionCoordinator::new(4, Duration::ZERO, Inline);
        let mut states = coordinator.subscribe();
        assert_eq!(next(&mut states).await, SelectionState::Idle);

        coordinator.start(0..10u32, |_| {});

        let expected = [
            SelectionState::InProgress {
                selected: 0,
                total: 10,
            },
            SelectionState::InProgress {
                selected: 4,
                total: 10,
            },
            SelectionState::InProgress {
                selected: 8,
                total: 10,
            },
            SelectionState::InProgress {
                selected: 10,
                total: 10,
            },
            SelectionState::Finished,
        ];
        for state in expected {
            assert_eq!(next(&mut states).await, state);
        }
        assert!(!coordinator.is_running());
    }

    #[tokio::test]
    async fn test_cancel_without_campaign_is_noop() {
        let coordinator = SelectionCoordinator::new(2, Duration::ZERO, Inline);
        coordinator.cancel();
        coordinator.cancel();
        assert_eq!(coordinator.state(), SelectionState::Idle);
    }

    #[tokio::test]
    async fn test_cancel_during_pause() {
        let (foreground, thread) = ForegroundQueue::spawn_dedicated("coord-cancel").unwrap();
        let coordinator = SelectionCoordinator::new(1, Duration::from_secs(30), foreground);
        let mut states = coordinator.subscribe();
        assert_eq!(next(&mut states).await, SelectionState::Idle);

        coordinator.start(vec!['a', 'b', 'c'], |_| {});
        assert_eq!(
            next(&mut states).await,
            SelectionState::InProgress {
                selected: 0,
                total: 3
            }
        );
        assert_eq!(
            next(&mut states).await,
            SelectionState::InProgress {
                selected: 1,
                total: 3
            }
        );

        // Loop is now sleeping for 30s
        coordinator.cancel();
        coordinator.cancel();
        assert_eq!(next(&mut states).await, SelectionState::Cancelled);
        assert!(!coordinator.is_running());

        drop(coordinator);
        thread.join().unwrap();
    }

    #[tokio::test]
    async fn test_cancel_and_reset_fences_loop() {
        let (foreground, thread) = ForegroundQueue::spawn_dedicated("coord-reset").unwrap();
        let coordinator = SelectionCoordinator::new(1, Duration::from_millis(20), foreground);

        coordinator.start(0..100u32, |_| {});
        assert!(coordinator.is_running());
        coordinator.cancel_and_reset();
        assert!(!coordinator.is_running());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(coordinator.state(), SelectionState::Idle);

        drop(coordinator);
        thread.join().unwrap();
    }

    #[tokio::test]
    async fn test_closed_foreground_cancels_campaign() {
        let (foreground, receiver) = ForegroundQueue::channel();
        drop(receiver);
        let coordinator = SelectionCoordinator::new(2, Duration::ZERO, foreground);
        let mut states = coordinator.subscribe();
        assert_eq!(next(&mut states).await, SelectionState::Idle);

        coordinator.start(vec![1, 2, 3], |_| {});
        assert_eq!(
            next(&mut states).await,
            SelectionState::InProgress {
                selected: 0,
                total: 3
            }
        );
        assert_eq!(next(&mut states).await, SelectionState::Cancelled);
    }

    #[test]
    fn test_debug_output() {
        let coordinator = SelectionCoordinator::new(5, Duration::ZERO, Inline);
        let debug = format!("{coordinator:?}");
        assert!(debug.contains("batch_size: 5"));
        assert!(debug.contains("Idle"));
    }
}
