//! Latest-value state broadcasting
//!
//! [`StatePublisher`] stores the last published [`SelectionState`] and fans every new value
//! out to all live subscribers. A new subscriber first receives the current value, then
//! every later transition in emission order. Delivery is lossless: each subscriber has its
//! own unbounded queue, so a slow reader never causes another reader to miss a transition.

use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::types::SelectionState;

/// Broadcast subject with replay of the latest value
#[derive(Debug)]
pub struct StatePublisher {
    inner: Mutex<PublisherInner>,
}

#[derive(Debug)]
struct PublisherInner {
    current: SelectionState,
    subscribers: Vec<mpsc::UnboundedSender<SelectionState>>,
}

impl StatePublisher {
    /// Create a publisher holding `initial` as its current value
    pub fn new(initial: SelectionState) -> Self {
        Self {
            inner: Mutex::new(PublisherInner {
                current: initial,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Most recently published value
    pub fn current(&self) -> SelectionState {
        self.lock().current
    }

    /// Subscribe to the current value followed by all future values
    pub fn subscribe(&self) -> StateStream {
        let mut inner = self.lock();
        let (tx, rx) = mpsc::unbounded_channel();
        // Receiver is alive, the send cannot fail
        tx.send(inner.current).ok();
        inner.subscribers.push(tx);
        StateStream {
            inner: UnboundedReceiverStream::new(rx),
        }
    }

    /// Store `state` as current and deliver it to every live subscriber
    ///
    /// Subscribers whose stream was dropped are pruned here.
    pub fn publish(&self, state: SelectionState) {
        let mut inner = self.lock();
        inner.current = state;
        inner.subscribers.retain(|tx| tx.send(state).is_ok());
        tracing::trace!(%state, subscribers = inner.subscribers.len(), "Published state");
    }

    /// Number of subscribers that were live at the last publish or subscribe
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.lock();
        inner.subscribers.retain(|tx| !tx.is_closed());
        inner.subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, PublisherInner> {
        // State is a plain value, a panic mid-publish cannot leave it torn
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StatePublisher {
    fn default() -> Self {
        Self::new(SelectionState::Idle)
    }
}

/// Live stream of [`SelectionState`] values for one subscriber
///
/// Ends when the publisher is dropped.
#[derive(Debug)]
pub struct StateStream {
    inner: UnboundedReceiverStream<SelectionState>,
}

impl StateStream {
    /// Receive the next state, `None` once the publisher is gone
    pub async fn recv(&mut self) -> Option<SelectionState> {
        self.inner.next().await
    }

    /// Skip ahead to the next `Finished` or `Cancelled` state
    ///
    /// If the current value is already terminal it is returned immediately.
    pub async fn wait_for_terminal(&mut self) -> Option<SelectionState> {
        while let Some(state) = self.recv().await {
            if state.is_terminal() {
                return Some(state);
            }
        }
        None
    }
}

impl Stream for StateStream {
    type Item = SelectionState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
