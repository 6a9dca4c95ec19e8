//! # sinkwatch
//!
//! A terminal dashboard and library for watching the Kafka sink connections
//! of an Ignition gateway.
//!
//! The gateway reports its Kafka connections, their alarm filters, and
//! per-source message statistics on a status route. This crate polls that
//! route on a fixed interval, keeps the latest snapshot (and the latest
//! error) in a shared store, and projects it into a loading indicator, a
//! blank "no sinks" state, or four gauges over three tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐   ┌─────────┐   ┌──────────┐   ┌──────────┐     │
//! │  │ poller  │──▶│  store  │──▶│   app    │──▶│    ui    │     │
//! │  │ (timer) │   │ (watch) │   │ (state)  │   │(ratatui) │     │
//! │  └────┬────┘   └─────────┘   └────┬─────┘   └──────────┘     │
//! │       │                           │                          │
//! │       ▼                           ▼                          │
//! │  ┌─────────┐                 ┌──────────┐                    │
//! │  │ source  │◀─ Http | File   │   data   │ project + history  │
//! │  └─────────┘                 └──────────┘                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`StatusFetcher`] trait, HTTP and file fetchers,
//!   the wire types, and [`FetchError`]
//! - **[`poller`]**: Interval-driven fetching with overlap skipping and
//!   cancellation via [`PollHandle`]
//! - **[`store`]**: Latest status and latest error, shared through a
//!   `tokio::sync::watch` channel
//! - **[`data`]**: The pure [`project`] function and message-rate history
//! - **[`app`]**, **[`events`]**, **[`ui`]**: Interactive terminal front end
//! - **[`settings`]**: Layered configuration from file and environment
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a gateway
//! sinkwatch --url http://localhost:8088
//!
//! # Watch a status JSON file
//! sinkwatch --file status.json --interval 1000
//!
//! # Fetch once and write the projected view as JSON
//! sinkwatch --url http://localhost:8088 --export view.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use sinkwatch::{project, ConnectionStatus, Projection};
//!
//! let status: ConnectionStatus = serde_json::from_str(
//!     r#"{"Enabled": true, "count": 0, "connections": [], "sinks": []}"#,
//! ).unwrap();
//!
//! assert!(matches!(project(Some(&status), None), Projection::Empty(_)));
//! assert_eq!(project(None, None), Projection::Loading);
//! ```
//!
//! ### Polling into a store
//!
//! ```no_run
//! use std::sync::Arc;
//! use sinkwatch::{HttpFetcher, StatusPoller, StatusStore};
//!
//! # tokio_test::block_on(async {
//! let fetcher = HttpFetcher::new("http://localhost:8088").unwrap();
//! let (store, mut reader) = StatusStore::new("gateway");
//! let handle = StatusPoller::new(Arc::new(fetcher)).start(store);
//!
//! if let Some(state) = reader.poll() {
//!     println!("error: {:?}", state.error);
//! }
//! handle.cancel();
//! # });
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod poller;
pub mod settings;
pub mod source;
pub mod store;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, Focus};
pub use data::{project, BlankState, History, Indicator, ItemTable, Projection, StatusTables};
pub use poller::{
    PollCounters, PollHandle, StatusPoller, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL,
};
pub use settings::Settings;
pub use source::{
    Connection, ConnectionStatus, FetchError, FileFetcher, HttpFetcher, Sink, SinkStat,
    StatusFetcher, DEFAULT_STATUS_PATH,
};
pub use store::{StatusReader, StatusState, StatusStore};
