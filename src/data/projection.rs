//! Projection of a status snapshot into displayable tables.
//!
//! [`project`] is the single decision point for the view: it turns the two
//! store slots (status, error) into exactly one of three states. Everything
//! it returns is plain owned data, so the UI never looks at the wire types.

use serde::Serialize;

use crate::source::{Connection, ConnectionStatus, Sink};

/// Text shown in place of an absent optional field.
pub const NONE_TEXT: &str = "none";

/// What the view should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Projection {
    /// No status has arrived yet.
    Loading,
    /// The gateway reports no connections.
    Empty(BlankState),
    /// Indicators and tables for a configured gateway.
    Populated(StatusTables),
}

impl Projection {
    /// Returns the tables when populated.
    pub fn tables(&self) -> Option<&StatusTables> {
        match self {
            Projection::Populated(tables) => Some(tables),
            _ => None,
        }
    }
}

/// A labeled external link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: &'static str,
    pub url: &'static str,
}

/// Placeholder shown when no sinks are configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlankState {
    pub heading: &'static str,
    pub body: &'static str,
    pub link: Link,
}

impl Default for BlankState {
    fn default() -> Self {
        Self {
            heading: "There are no sinks defined.",
            body: "Kafka sinks allow you to stream data from Ignition to Kafka.",
            link: Link {
                label: "Learn More",
                url: "https://google.com",
            },
        }
    }
}

/// A labeled on/off gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Indicator {
    pub label: &'static str,
    pub enabled: bool,
}

impl Indicator {
    /// Display value, "YES" or "NO".
    pub fn value(&self) -> &'static str {
        if self.enabled {
            "YES"
        } else {
            "NO"
        }
    }
}

/// A column header with its relative width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub label: &'static str,
    pub weight: u16,
}

const fn header(label: &'static str, weight: u16) -> Header {
    Header { label, weight }
}

pub static CONNECTION_HEADERS: [Header; 5] = [
    header("Brokers", 2),
    header("Use SSL", 2),
    header("Tag History Topic", 2),
    header("Alarms Topic", 2),
    header("Audit Topic", 2),
];

pub static ALARM_FILTER_HEADERS: [Header; 4] = [
    header("Minimum Priority", 1),
    header("Source", 1),
    header("Display Path", 1),
    header("Source Path", 2),
];

pub static STAT_HEADERS: [Header; 6] = [
    header("Source", 1),
    header("Messages Sent", 1),
    header("Failed to Send", 1),
    header("Last Sent", 1),
    header("Up Time (days)", 1),
    header("Start Time", 1),
];

/// A titled table of string cells with an optional inline error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemTable {
    pub title: &'static str,
    pub headers: &'static [Header],
    pub rows: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemTable {
    fn new(title: &'static str, headers: &'static [Header], rows: Vec<Vec<String>>) -> Self {
        Self {
            title,
            headers,
            rows,
            error: None,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything shown in the populated view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusTables {
    /// Stream, store-and-forward, alarm and audit gauges, in that order.
    pub indicators: [Indicator; 4],
    /// "Kafka Settings": one row per connection.
    pub connections: ItemTable,
    /// "Alarm Filters": one row per connection.
    pub alarm_filters: ItemTable,
    /// "Message Stats": one row per sink stat across all sinks.
    pub stats: ItemTable,
}

impl StatusTables {
    /// The three tables in display order.
    pub fn tables(&self) -> [&ItemTable; 3] {
        [&self.connections, &self.alarm_filters, &self.stats]
    }
}

/// Decide what to show for the given store slots.
///
/// The empty/populated branch trusts `count`, not the length of the
/// connection list. The error, if any, is attached to every table and does
/// not suppress the rows that are available.
pub fn project(status: Option<&ConnectionStatus>, error: Option<&str>) -> Projection {
    let Some(status) = status else {
        return Projection::Loading;
    };

    if status.count <= 0 {
        return Projection::Empty(BlankState::default());
    }

    let connections = status.connections.as_deref().unwrap_or_default();
    let sinks = status.sinks.as_deref().unwrap_or_default();

    let mut tables = StatusTables {
        indicators: indicators(status),
        connections: ItemTable::new(
            "Kafka Settings",
            &CONNECTION_HEADERS,
            connection_rows(connections),
        ),
        alarm_filters: ItemTable::new(
            "Alarm Filters",
            &ALARM_FILTER_HEADERS,
            alarm_filter_rows(connections),
        ),
        stats: ItemTable::new("Message Stats", &STAT_HEADERS, stat_rows(sinks)),
    };

    if let Some(error) = error {
        for table in [&mut tables.connections, &mut tables.alarm_filters, &mut tables.stats] {
            table.error = Some(error.to_string());
        }
    }

    Projection::Populated(tables)
}

/// The four gauges for a status.
pub fn indicators(status: &ConnectionStatus) -> [Indicator; 4] {
    [
        Indicator {
            label: "Kafka Stream Enabled",
            enabled: status.enabled,
        },
        Indicator {
            label: "Store & Forward Enabled",
            enabled: status.use_store_and_forward,
        },
        Indicator {
            label: "Alarm Streaming Enabled",
            enabled: status.alarms_enabled,
        },
        Indicator {
            label: "Audit Streaming Enabled",
            enabled: status.audit_enabled,
        },
    ]
}

/// Rows for the "Kafka Settings" table.
pub fn connection_rows(connections: &[Connection]) -> Vec<Vec<String>> {
    connections
        .iter()
        .map(|c| {
            vec![
                c.brokers.clone(),
                c.is_ssl.to_string(),
                c.tag_history_topic.clone(),
                c.alarms_topic.clone(),
                c.audit_topic.clone(),
            ]
        })
        .collect()
}

/// Rows for the "Alarm Filters" table.
pub fn alarm_filter_rows(connections: &[Connection]) -> Vec<Vec<String>> {
    connections
        .iter()
        .map(|c| {
            vec![
                value_text(&c.minimum_priority),
                or_none(c.source.as_deref()),
                or_none(c.display_path.as_deref()),
                or_none(c.source_path.as_deref()),
            ]
        })
        .collect()
}

/// Rows for the "Message Stats" table, sink by sink then stat by stat.
pub fn stat_rows(sinks: &[Sink]) -> Vec<Vec<String>> {
    sinks
        .iter()
        .flat_map(|sink| sink.stats.iter())
        .map(|s| {
            vec![
                s.source.clone(),
                s.message_count.to_string(),
                s.failed_count.to_string(),
                s.last_message_time.clone(),
                s.life_span_days.to_string(),
                s.start_time.clone(),
            ]
        })
        .collect()
}

fn or_none(value: Option<&str>) -> String {
    value.unwrap_or(NONE_TEXT).to_string()
}

/// Render a loosely typed JSON value as cell text.
fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        // f64 Display drops the ".0" of whole numbers
        serde_json::Value::Number(n) if n.is_f64() => {
            n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string())
        }
        other => other.to_string(),
    }
}
