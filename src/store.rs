//! Injected status state container.
//!
//! The store holds the two slots the view reads: the current status
//! snapshot and the current fetch error. It is backed by a tokio watch
//! channel, so the poller writes without blocking and the render loop reads
//! the latest value without waiting.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tracing::debug;

use crate::source::{ConnectionStatus, FetchError};

/// Contents of the store at one point in time.
#[derive(Debug, Clone, Default)]
pub struct StatusState {
    /// Last successfully fetched snapshot, `None` until the first success.
    pub status: Option<Arc<ConnectionStatus>>,
    /// Error from the most recent fetch, cleared by the next success.
    pub error: Option<String>,
    /// When the status slot was last replaced.
    pub updated_at: Option<Instant>,
    /// Incremented on every dispatch.
    pub generation: u64,
}

/// Writing half of the status store.
///
/// # Example
///
/// ```
/// use sinkwatch::{ConnectionStatus, StatusStore};
///
/// let (store, mut reader) = StatusStore::new("example");
/// store.dispatch(Ok(ConnectionStatus::default()));
///
/// let state = reader.poll().unwrap();
/// assert!(state.status.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct StatusStore {
    sender: Arc<watch::Sender<StatusState>>,
    description: Arc<str>,
}

impl StatusStore {
    /// Create a store and its first reader.
    ///
    /// `description` names where snapshots come from (e.g., "gateway:
    /// http://localhost:8088") and is shown in the status bar.
    pub fn new(description: &str) -> (Self, StatusReader) {
        let (tx, rx) = watch::channel(StatusState::default());
        let store = Self {
            sender: Arc::new(tx),
            description: Arc::from(description),
        };
        let reader = StatusReader::new(rx, store.description.clone());
        (store, reader)
    }

    /// Create another reader observing this store.
    pub fn subscribe(&self) -> StatusReader {
        StatusReader::new(self.sender.subscribe(), self.description.clone())
    }

    /// Apply the outcome of one fetch.
    ///
    /// A success replaces the status slot and clears the error. A failure
    /// sets the error and leaves the previous snapshot in place so stale
    /// rows stay visible.
    pub fn dispatch(&self, result: Result<ConnectionStatus, FetchError>) {
        self.sender.send_modify(|state| {
            state.generation += 1;
            match result {
                Ok(status) => {
                    debug!(count = status.count, generation = state.generation, "status updated");
                    state.status = Some(Arc::new(status));
                    state.error = None;
                    state.updated_at = Some(Instant::now());
                }
                Err(e) => {
                    debug!(error = %e, generation = state.generation, "status fetch failed");
                    state.error = Some(e.to_string());
                }
            }
        });
    }

    /// Returns a copy of the current state.
    pub fn current(&self) -> StatusState {
        self.sender.borrow().clone()
    }
}

/// Reading half of the status store, held by the render layer.
#[derive(Debug)]
pub struct StatusReader {
    receiver: watch::Receiver<StatusState>,
    description: Arc<str>,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl StatusReader {
    fn new(receiver: watch::Receiver<StatusState>, description: Arc<str>) -> Self {
        Self {
            receiver,
            description,
            initial_returned: false,
        }
    }

    /// Poll for a new state without blocking.
    ///
    /// Returns the state on the first call and afterwards only when a
    /// dispatch happened since the previous poll.
    pub fn poll(&mut self) -> Option<StatusState> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    /// Returns a copy of the current state regardless of change tracking.
    pub fn current(&self) -> StatusState {
        self.receiver.borrow().clone()
    }

    /// Returns a human-readable description of the source.
    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(count: i64) -> ConnectionStatus {
        ConnectionStatus {
            count,
            ..Default::default()
        }
    }

    #[test]
    fn test_reader_poll() {
        let (store, mut reader) = StatusStore::new("test");

        // Initially returns the empty state
        let state = reader.poll().unwrap();
        assert!(state.status.is_none());
        assert!(state.error.is_none());
        assert_eq!(state.generation, 0);

        // No change, so poll returns None
        assert!(reader.poll().is_none());

        store.dispatch(Ok(status(2)));

        let state = reader.poll().unwrap();
        assert_eq!(state.status.unwrap().count, 2);
        assert_eq!(state.generation, 1);
        assert!(state.updated_at.is_some());
        assert!(reader.poll().is_none());
    }

    #[test]
    fn test_error_keeps_previous_status() {
        let (store, mut reader) = StatusStore::new("test");
        store.dispatch(Ok(status(3)));
        store.dispatch(Err(FetchError::Timeout));

        let state = reader.poll().unwrap();
        assert_eq!(state.status.as_ref().unwrap().count, 3);
        assert_eq!(state.error.as_deref(), Some("Request timed out"));
        assert_eq!(state.generation, 2);
    }

    #[test]
    fn test_success_clears_error() {
        let (store, _reader) = StatusStore::new("test");
        store.dispatch(Err(FetchError::Status(500)));
        assert!(store.current().status.is_none());
        assert!(store.current().error.is_some());

        store.dispatch(Ok(status(1)));
        let state = store.current();
        assert!(state.error.is_none());
        assert_eq!(state.status.unwrap().count, 1);
    }

    #[test]
    fn test_snapshot_replaced_not_mutated() {
        let (store, reader) = StatusStore::new("test");
        store.dispatch(Ok(status(1)));
        let first = reader.current().status.unwrap();

        store.dispatch(Ok(status(5)));
        let second = reader.current().status.unwrap();

        assert_eq!(first.count, 1);
        assert_eq!(second.count, 5);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_dispatch_without_readers() {
        let (store, reader) = StatusStore::new("test");
        drop(reader);

        store.dispatch(Ok(status(4)));
        assert_eq!(store.current().status.unwrap().count, 4);

        let mut late = store.subscribe();
        assert_eq!(late.poll().unwrap().status.unwrap().count, 4);
        assert_eq!(late.description(), "test");
    }
}
