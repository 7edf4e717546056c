//! Recording handlers and foreground fixtures

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use batch_select::ForegroundQueue;

/// Name given to the foreground thread in every test
pub const FOREGROUND_THREAD: &str = "test-foreground";

/// Spawn a dedicated foreground thread for a test
pub fn spawn_foreground() -> (ForegroundQueue, JoinHandle<()>) {
    ForegroundQueue::spawn_dedicated(FOREGROUND_THREAD).expect("failed to spawn foreground thread")
}

/// Records every item a handler is applied to, and the thread it ran on
#[derive(Clone)]
pub struct Recorder<T> {
    seen: Arc<Mutex<Vec<(T, Option<String>)>>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handler that appends each item to this recorder
    pub fn handler(&self) -> impl Fn(&T) + Send + Sync + 'static {
        let seen = Arc::clone(&self.seen);
        move |item: &T| {
            let thread = std::thread::current().name().map(str::to_string);
            seen.lock().unwrap().push((item.clone(), thread));
        }
    }

    /// Items seen so far, in invocation order
    pub fn items(&self) -> Vec<T> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|(item, _)| item.clone())
            .collect()
    }

    /// Number of handler invocations so far
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Returns true if every invocation ran on the test foreground thread
    pub fn all_on_foreground(&self) -> bool {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .all(|(_, thread)| thread.as_deref() == Some(FOREGROUND_THREAD))
    }
}
