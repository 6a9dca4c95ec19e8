//! Status sources.
//!
//! This module provides a trait-based abstraction for fetching status
//! snapshots from the gateway, plus the wire types and the single error
//! kind a fetch can produce.

mod error;
mod file;
mod http;
mod status;

pub use error::FetchError;
pub use file::FileFetcher;
pub use http::{HttpFetcher, DEFAULT_STATUS_PATH};
pub use status::{Connection, ConnectionStatus, Sink, SinkStat};

use std::fmt::Debug;

use async_trait::async_trait;

/// Trait for fetching a status snapshot from some backend.
///
/// Implementations are driven by the [`StatusPoller`](crate::StatusPoller),
/// which guarantees that at most one `fetch` is outstanding at a time.
///
/// # Example
///
/// ```no_run
/// use sinkwatch::{FileFetcher, StatusFetcher};
///
/// # tokio_test::block_on(async {
/// let fetcher = FileFetcher::new("status.json");
/// match fetcher.fetch().await {
///     Ok(status) => println!("{} connections", status.count),
///     Err(e) => println!("fetch failed: {}", e),
/// }
/// # });
/// ```
#[async_trait]
pub trait StatusFetcher: Send + Sync + Debug {
    /// Fetch the current status snapshot.
    async fn fetch(&self) -> Result<ConnectionStatus, FetchError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
