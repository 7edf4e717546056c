//! State stream helpers and campaign assertions

use std::time::Duration;

use batch_select::{SelectionState, StateStream};

/// Default time allowed for any single wait in these tests
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Receive the next state, panicking on timeout or a closed stream
pub async fn next_state(stream: &mut StateStream) -> SelectionState {
    tokio::time::timeout(WAIT_TIMEOUT, stream.recv())
        .await
        .expect("timed out waiting for state")
        .expect("state stream closed")
}

/// Collect states up to and including the first one matching `predicate`
pub async fn collect_until<F>(stream: &mut StateStream, predicate: F) -> Vec<SelectionState>
where
    F: Fn(&SelectionState) -> bool,
{
    let mut states = Vec::new();
    loop {
        let state = next_state(stream).await;
        let done = predicate(&state);
        states.push(state);
        if done {
            return states;
        }
    }
}

/// Collect states up to and including the first terminal state
pub async fn collect_until_terminal(stream: &mut StateStream) -> Vec<SelectionState> {
    collect_until(stream, SelectionState::is_terminal).await
}

/// Assert nothing else is published within `window`
pub async fn assert_quiet(stream: &mut StateStream, window: Duration) {
    if let Ok(state) = tokio::time::timeout(window, stream.recv()).await {
        panic!("expected no further states, got {state:?}");
    }
}

/// Assert `states` is exactly one completed campaign over `total` items in batches of `batch_size`
pub fn assert_completed_campaign(states: &[SelectionState], total: usize, batch_size: usize) {
    let mut expected = vec![SelectionState::InProgress { selected: 0, total }];
    let mut selected = 0;
    while selected < total {
        selected = (selected + batch_size).min(total);
        expected.push(SelectionState::InProgress { selected, total });
    }
    expected.push(SelectionState::Finished);

    assert_eq!(states, expected.as_slice());
}
