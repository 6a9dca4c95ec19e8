//! Application state and navigation logic.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::data::{project, History, ItemTable, Projection};
use crate::source::ConnectionStatus;
use crate::store::{StatusReader, StatusState};
use crate::ui::Theme;

/// The table that receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// "Kafka Settings": one row per connection.
    #[default]
    Connections,
    /// "Alarm Filters": one row per connection.
    AlarmFilters,
    /// "Message Stats": one row per sink stat.
    Stats,
}

impl Focus {
    /// Cycle to the next table.
    pub fn next(self) -> Self {
        match self {
            Focus::Connections => Focus::AlarmFilters,
            Focus::AlarmFilters => Focus::Stats,
            Focus::Stats => Focus::Connections,
        }
    }

    /// Cycle to the previous table.
    pub fn prev(self) -> Self {
        match self {
            Focus::Connections => Focus::Stats,
            Focus::AlarmFilters => Focus::Connections,
            Focus::Stats => Focus::AlarmFilters,
        }
    }

    /// Position of the table in display order.
    pub fn index(self) -> usize {
        match self {
            Focus::Connections => 0,
            Focus::AlarmFilters => 1,
            Focus::Stats => 2,
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    // Store
    reader: StatusReader,
    pub state: StatusState,
    pub projection: Projection,
    pub history: History,
    /// Snapshot last fed into `history`, to record each snapshot once.
    recorded: Option<Arc<ConnectionStatus>>,

    // Navigation state
    pub focus: Focus,
    /// Selected row per table, indexed by `Focus::index`.
    pub selected: [usize; 3],

    // UI
    pub theme: Theme,
    /// Gateway base URL, for the Configure link in the header.
    pub gateway_url: Option<String>,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading from the given store reader.
    pub fn new(reader: StatusReader, theme: Theme) -> Self {
        Self {
            running: true,
            show_help: false,
            reader,
            state: StatusState::default(),
            projection: Projection::Loading,
            history: History::new(),
            recorded: None,
            focus: Focus::default(),
            selected: [0; 3],
            theme,
            gateway_url: None,
            status_message: None,
        }
    }

    /// Set the gateway base URL shown as the Configure link.
    pub fn with_gateway_url(mut self, url: &str) -> Self {
        self.gateway_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Returns a description of the current status source.
    pub fn source_description(&self) -> &str {
        self.reader.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Pick up the latest store state and re-project it.
    ///
    /// Returns true if the store changed since the last refresh.
    pub fn refresh(&mut self) -> bool {
        let Some(state) = self.reader.poll() else {
            return false;
        };

        if let Some(status) = &state.status {
            let is_new = !self.recorded.as_ref().is_some_and(|last| Arc::ptr_eq(last, status));
            if is_new {
                self.history.record(status, state.updated_at.unwrap_or_else(Instant::now));
                self.recorded = Some(status.clone());
            }
        }

        self.projection = project(state.status.as_deref(), state.error.as_deref());
        self.state = state;
        self.clamp_selection();
        true
    }

    /// The configuration page on the gateway, if the URL is known.
    pub fn configure_url(&self) -> Option<String> {
        self.gateway_url.as_ref().map(|url| format!("{}/web/config/hce.hub", url))
    }

    /// Returns the table with focus, when tables are shown.
    pub fn focused_table(&self) -> Option<&ItemTable> {
        let tables = self.projection.tables()?;
        Some(tables.tables()[self.focus.index()])
    }

    /// Selected row of the focused table.
    pub fn selected_row(&self) -> usize {
        self.selected[self.focus.index()]
    }

    fn focused_len(&self) -> usize {
        self.focused_table().map_or(0, ItemTable::len)
    }

    fn clamp_selection(&mut self) {
        let Some(tables) = self.projection.tables() else {
            self.selected = [0; 3];
            return;
        };
        for (selected, table) in self.selected.iter_mut().zip(tables.tables()) {
            *selected = (*selected).min(table.len().saturating_sub(1));
        }
    }

    /// Move focus to the next table.
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Move focus to the previous table.
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Move focus to a specific table.
    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    /// Move selection down by one row.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one row.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n rows.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.focused_len().saturating_sub(1);
        let selected = &mut self.selected[self.focus.index()];
        *selected = (*selected + n).min(max);
    }

    /// Move selection up by n rows.
    pub fn select_prev_n(&mut self, n: usize) {
        let selected = &mut self.selected[self.focus.index()];
        *selected = selected.saturating_sub(n);
    }

    /// Jump to the first row.
    pub fn select_first(&mut self) {
        self.selected[self.focus.index()] = 0;
    }

    /// Jump to the last row.
    pub fn select_last(&mut self) {
        self.selected[self.focus.index()] = self.focused_len().saturating_sub(1);
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current projection to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if self.projection == Projection::Loading {
            anyhow::bail!("No data to export");
        }
        write_export(path, self.source_description(), &self.projection)
    }
}

/// Write a projection as pretty JSON, tagged with its source.
pub fn write_export(path: &Path, source: &str, projection: &Projection) -> Result<()> {
    let export = serde_json::json!({
        "source": source,
        "view": projection,
    });
    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Connection, FetchError, Sink, SinkStat};
    use crate::store::StatusStore;

    fn populated_status() -> ConnectionStatus {
        ConnectionStatus {
            enabled: true,
            count: 2,
            connections: Some(vec![
                Connection {
                    brokers: "a:9092".to_string(),
                    ..Default::default()
                },
                Connection {
                    brokers: "b:9092".to_string(),
                    ..Default::default()
                },
            ]),
            sinks: Some(vec![Sink {
                stats: (0..4)
                    .map(|i| SinkStat {
                        source: format!("source-{}", i),
                        message_count: i * 10,
                        ..Default::default()
                    })
                    .collect(),
            }]),
            ..Default::default()
        }
    }

    fn app() -> (StatusStore, App) {
        let (store, reader) = StatusStore::new("test");
        (store, App::new(reader, Theme::dark()))
    }

    #[test]
    fn test_starts_loading() {
        let (_store, mut app) = app();
        assert!(app.refresh());
        assert_eq!(app.projection, Projection::Loading);
        assert!(app.focused_table().is_none());
        assert!(!app.refresh());
    }

    #[test]
    fn test_refresh_projects_store() {
        let (store, mut app) = app();
        store.dispatch(Ok(populated_status()));
        assert!(app.refresh());

        let tables = app.projection.tables().unwrap();
        assert_eq!(tables.connections.len(), 2);
        assert_eq!(tables.stats.len(), 4);
        assert_eq!(app.history.sample_count("source-1"), 1);
    }

    #[test]
    fn test_error_does_not_rerecord_history() {
        let (store, mut app) = app();
        store.dispatch(Ok(populated_status()));
        app.refresh();
        store.dispatch(Err(FetchError::Timeout));
        app.refresh();

        assert_eq!(app.history.sample_count("source-1"), 1);
        let table = app.focused_table().unwrap();
        assert_eq!(table.error.as_deref(), Some("Request timed out"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_selection_is_per_table_and_clamped() {
        let (store, mut app) = app();
        store.dispatch(Ok(populated_status()));
        app.refresh();

        app.select_next_n(10);
        assert_eq!(app.selected_row(), 1);

        app.set_focus(Focus::Stats);
        app.select_last();
        assert_eq!(app.selected_row(), 3);
        app.select_prev();
        assert_eq!(app.selected_row(), 2);

        app.prev_focus();
        assert_eq!(app.focus, Focus::AlarmFilters);
        assert_eq!(app.selected_row(), 0);

        // Fewer rows in the next snapshot pull the selection back in range
        let mut smaller = populated_status();
        smaller.sinks = Some(vec![]);
        store.dispatch(Ok(smaller));
        app.refresh();
        assert_eq!(app.selected[Focus::Stats.index()], 0);
        assert_eq!(app.selected[Focus::Connections.index()], 1);
    }

    #[test]
    fn test_focus_cycles() {
        let mut focus = Focus::Connections;
        for _ in 0..3 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Connections);
        assert_eq!(Focus::Connections.prev(), Focus::Stats);
    }

    #[test]
    fn test_configure_url() {
        let (_store, app) = app();
        assert!(app.configure_url().is_none());
        let app = app.with_gateway_url("http://gw:8088/");
        assert_eq!(app.configure_url().as_deref(), Some("http://gw:8088/web/config/hce.hub"));
    }

    #[test]
    fn test_export_state() {
        let (store, mut app) = app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        app.refresh();
        assert!(app.export_state(&path).is_err());

        store.dispatch(Ok(populated_status()));
        app.refresh();
        app.export_state(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["source"], "test");
        assert_eq!(json["view"]["state"], "populated");
        assert_eq!(json["view"]["connections"]["rows"][1][0], "b:9092");
        assert_eq!(json["view"]["indicators"][0]["enabled"], true);
    }

    #[test]
    fn test_status_message_expires() {
        let (_store, mut app) = app();
        app.set_status_message("Exported".to_string());
        assert_eq!(app.get_status_message(), Some("Exported"));

        app.status_message = Some(("old".to_string(), Instant::now() - Duration::from_secs(5)));
        assert!(app.get_status_message().is_none());
    }
}
