//! Periodic status polling.
//!
//! The poller fetches a snapshot immediately and then once per interval,
//! never running two fetches at once: a tick that arrives while a fetch is
//! still outstanding is skipped, not queued. Completed fetches are
//! dispatched into a [`StatusStore`].
//!
//! ```text
//!  tick ──▶ in flight? ──yes──▶ skip
//!              │no
//!              ▼
//!        spawn fetch ──▶ done channel ──▶ StatusStore::dispatch
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

use crate::source::{ConnectionStatus, FetchError, StatusFetcher};
use crate::store::StatusStore;

/// Default time between fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Shortest accepted interval; `tokio::time::interval` rejects zero.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Issues status fetches on a fixed interval.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use sinkwatch::{FileFetcher, StatusPoller, StatusStore};
///
/// # tokio_test::block_on(async {
/// let (store, mut reader) = StatusStore::new("file: status.json");
/// let poller = StatusPoller::new(Arc::new(FileFetcher::new("status.json")))
///     .interval(Duration::from_secs(5));
///
/// let handle = poller.start(store);
/// // ... render from `reader` ...
/// handle.cancel();
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct StatusPoller {
    fetcher: Arc<dyn StatusFetcher>,
    interval: Duration,
}

impl StatusPoller {
    /// Create a poller with the default 5 second interval.
    pub fn new(fetcher: Arc<dyn StatusFetcher>) -> Self {
        Self {
            fetcher,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the polling interval, raised to [`MIN_POLL_INTERVAL`] if shorter.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Returns the configured interval.
    pub fn period(&self) -> Duration {
        self.interval
    }

    /// Start polling in a background task.
    ///
    /// Must be called from within a tokio runtime. Returns a handle that
    /// stops polling when cancelled or dropped.
    pub fn start(&self, store: StatusStore) -> PollHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let cancelled = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(Counters::default());

        let task = PollTask {
            fetcher: self.fetcher.clone(),
            store,
            interval: self.interval,
            cancelled: cancelled.clone(),
            counters: counters.clone(),
        };
        tokio::spawn(task.run(stop_rx));

        PollHandle {
            stop_tx,
            cancelled,
            counters,
        }
    }
}

/// Snapshot of poller activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollCounters {
    /// Fetches started.
    pub issued: u64,
    /// Ticks dropped because a fetch was still in flight.
    pub skipped: u64,
    /// Fetches dispatched as a new status.
    pub succeeded: u64,
    /// Fetches dispatched as an error.
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    issued: AtomicU64,
    skipped: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> PollCounters {
        PollCounters {
            issued: self.issued.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Handle for controlling a running poller.
///
/// Drop this handle to stop polling, or call `cancel()` explicitly. A fetch
/// already in flight is left to finish but its result is discarded.
#[derive(Debug)]
pub struct PollHandle {
    stop_tx: watch::Sender<bool>,
    cancelled: Arc<AtomicBool>,
    counters: Arc<Counters>,
}

impl PollHandle {
    /// Stop polling. No new fetch is issued after this returns.
    ///
    /// A fetch that completes concurrently with the call may still be
    /// dispatched once; anything completing later is discarded.
    pub fn cancel(self) {
        // Drop does the work
    }

    /// Returns true once the poller has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the current activity counters.
    pub fn counters(&self) -> PollCounters {
        self.counters.snapshot()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _ = self.stop_tx.send(true);
    }
}

struct PollTask {
    fetcher: Arc<dyn StatusFetcher>,
    store: StatusStore,
    interval: Duration,
    cancelled: Arc<AtomicBool>,
    counters: Arc<Counters>,
}

impl PollTask {
    async fn run(self, mut stop_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // The loop keeps a sender alive, so recv() never yields None
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        let mut in_flight = false;

        debug!(source = self.fetcher.description(), interval = ?self.interval, "poller started");

        loop {
            tokio::select! {
                biased;

                _ = stop_rx.changed() => break,

                Some(result) = done_rx.recv() => {
                    in_flight = false;
                    if self.is_cancelled() {
                        break;
                    }
                    self.dispatch(result);
                }

                _ = ticker.tick() => {
                    if self.is_cancelled() {
                        break;
                    }
                    if in_flight {
                        self.counters.skipped.fetch_add(1, Ordering::Relaxed);
                        trace!("previous fetch still in flight, skipping tick");
                        continue;
                    }
                    in_flight = true;
                    self.issue(done_tx.clone());
                }
            }
        }

        if in_flight {
            debug!("poller stopped with a fetch in flight, its result will be discarded");
        } else {
            debug!("poller stopped");
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Start one fetch in its own task so the loop keeps ticking.
    fn issue(&self, done: mpsc::UnboundedSender<Result<ConnectionStatus, FetchError>>) {
        self.counters.issued.fetch_add(1, Ordering::Relaxed);
        let fetcher = self.fetcher.clone();

        tokio::spawn(async move {
            let result = tokio::spawn(async move { fetcher.fetch().await })
                .await
                .unwrap_or_else(|e| Err(FetchError::Task(e.to_string())));
            // Fails only once the poller has stopped; the result is dropped
            let _ = done.send(result);
        });
    }

    fn dispatch(&self, result: Result<ConnectionStatus, FetchError>) {
        match &result {
            Ok(_) => {
                self.counters.succeeded.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(source = self.fetcher.description(), error = %e, "status fetch failed");
            }
        }
        self.store.dispatch(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Fetcher that records call times and sleeps a scripted delay per call.
    #[derive(Debug)]
    struct ScriptedFetcher {
        delays: Mutex<Vec<Duration>>,
        calls: Mutex<Vec<Instant>>,
        fail: bool,
    }

    impl ScriptedFetcher {
        fn new(delays: Vec<Duration>) -> Arc<Self> {
            Arc::new(Self {
                delays: Mutex::new(delays),
                calls: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                delays: Mutex::new(Vec::new()),
                calls: Mutex::new(Vec::new()),
                fail: true,
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl StatusFetcher for ScriptedFetcher {
        async fn fetch(&self) -> Result<ConnectionStatus, FetchError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(Instant::now());
                calls.len()
            };
            let delay = {
                let mut delays = self.delays.lock().unwrap();
                if delays.is_empty() {
                    Duration::ZERO
                } else {
                    delays.remove(0)
                }
            };
            tokio::time::sleep(delay).await;
            if self.fail {
                Err(FetchError::Timeout)
            } else {
                Ok(ConnectionStatus {
                    count: call as i64,
                    ..Default::default()
                })
            }
        }

        fn description(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_is_immediate() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let (store, _reader) = StatusStore::new("test");

        let handle = StatusPoller::new(fetcher.clone()).start(store.clone());
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(store.current().status.unwrap().count, 1);
        assert_eq!(handle.counters().succeeded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_tick_is_skipped() {
        // First fetch takes 7s, so the tick at 5s lands while it is in flight
        let fetcher = ScriptedFetcher::new(vec![Duration::from_millis(7000)]);
        let (store, _reader) = StatusStore::new("test");
        let start = Instant::now();

        let handle = StatusPoller::new(fetcher.clone()).start(store.clone());

        tokio::time::sleep(Duration::from_millis(10_001)).await;

        assert_eq!(fetcher.call_count(), 2);
        let calls = fetcher.calls.lock().unwrap().clone();
        assert_eq!(calls[0] - start, Duration::ZERO);
        assert_eq!(calls[1] - start, Duration::from_millis(10_000));

        let counters = handle.counters();
        assert_eq!(counters.issued, 2);
        assert_eq!(counters.skipped, 1);
        assert_eq!(counters.succeeded, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_interval() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let (store, _reader) = StatusStore::new("test");

        let _handle = StatusPoller::new(fetcher.clone())
            .interval(Duration::from_millis(1000))
            .start(store);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        // Ticks at 0, 1000, 2000, 3000
        assert_eq!(fetcher.call_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_further_fetches() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let (store, _reader) = StatusStore::new("test");

        let handle = StatusPoller::new(fetcher.clone()).start(store);
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(fetcher.call_count(), 1);

        handle.cancel();
        tokio::time::sleep(Duration::from_millis(20_000)).await;
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_in_flight_result() {
        let fetcher = ScriptedFetcher::new(vec![Duration::from_millis(3000)]);
        let (store, _reader) = StatusStore::new("test");

        let handle = StatusPoller::new(fetcher.clone()).start(store.clone());
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(fetcher.call_count(), 1);
        assert!(!handle.is_cancelled());

        drop(handle);
        tokio::time::sleep(Duration::from_millis(5000)).await;

        // The fetch ran to completion but nothing reached the store
        let state = store.current();
        assert!(state.status.is_none());
        assert_eq!(state.generation, 0);
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_dispatches_error() {
        let fetcher = ScriptedFetcher::failing();
        let (store, _reader) = StatusStore::new("test");

        let handle = StatusPoller::new(fetcher.clone()).start(store.clone());
        tokio::time::sleep(Duration::from_millis(1)).await;

        let state = store.current();
        assert!(state.status.is_none());
        assert_eq!(state.error.as_deref(), Some("Request timed out"));
        assert_eq!(handle.counters().failed, 1);

        // No retry before the next natural tick
        tokio::time::sleep(Duration::from_millis(4000)).await;
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let (store, _reader) = StatusStore::new("test");

        let poller = StatusPoller::new(fetcher.clone()).interval(Duration::ZERO);
        assert_eq!(poller.period(), MIN_POLL_INTERVAL);

        let _handle = poller.start(store.clone());
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(store.current().status.is_some());
        assert!(fetcher.call_count() > 1);
    }

    #[derive(Debug)]
    struct PanickingFetcher;

    #[async_trait]
    impl StatusFetcher for PanickingFetcher {
        async fn fetch(&self) -> Result<ConnectionStatus, FetchError> {
            panic!("fetcher bug");
        }

        fn description(&self) -> &str {
            "panicking"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_fetch_becomes_task_error() {
        let (store, _reader) = StatusStore::new("test");

        let handle = StatusPoller::new(Arc::new(PanickingFetcher)).start(store.clone());
        tokio::time::sleep(Duration::from_millis(1)).await;

        let state = store.current();
        assert!(state.error.unwrap().starts_with("Fetch task failed"));
        assert_eq!(handle.counters().failed, 1);

        // The poller survives and fetches again on the next tick
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(handle.counters().failed, 2);
    }

    #[test]
    fn test_default_interval() {
        let poller = StatusPoller::new(ScriptedFetcher::new(vec![]));
        assert_eq!(poller.period(), Duration::from_millis(5000));
        let poller = poller.interval(Duration::from_millis(250));
        assert_eq!(poller.period(), Duration::from_millis(250));
    }
}
