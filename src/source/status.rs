//! Wire types for the gateway's Kafka status payload.
//!
//! These types match the JSON returned by the gateway status route. Field
//! names on the wire follow the gateway's conventions (`Brokers`, `isSSL`,
//! `DispPath`, ...), so every field carries an explicit rename.

use serde::{Deserialize, Serialize};

/// A complete snapshot of connector and sink status.
///
/// A new snapshot replaces the previous one wholesale on every poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Whether Kafka streaming is enabled at all.
    #[serde(rename = "Enabled", default)]
    pub enabled: bool,

    /// Whether store-and-forward buffering is used for tag history.
    #[serde(rename = "UseStoreAndForward", default)]
    pub use_store_and_forward: bool,

    /// Whether alarm events are streamed.
    #[serde(rename = "AlarmsEnabled", default)]
    pub alarms_enabled: bool,

    /// Whether audit events are streamed.
    #[serde(rename = "AuditEnabled", default)]
    pub audit_enabled: bool,

    /// Number of configured connections as reported by the gateway.
    ///
    /// This is what decides between the empty and populated views, even if
    /// it disagrees with the length of `connections`.
    #[serde(default)]
    pub count: i64,

    /// Configured broker connections. `None` when the gateway omits the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<Connection>>,

    /// Active sinks with their message statistics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sinks: Option<Vec<Sink>>,
}

/// A broker endpoint and its topic routing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Comma-separated bootstrap broker list.
    #[serde(rename = "Brokers", default)]
    pub brokers: String,

    #[serde(rename = "isSSL", default)]
    pub is_ssl: bool,

    #[serde(rename = "TagHistoryTopic", default)]
    pub tag_history_topic: String,

    #[serde(rename = "AlarmsTopic", default)]
    pub alarms_topic: String,

    #[serde(rename = "AuditTopic", default)]
    pub audit_topic: String,

    /// Minimum alarm priority that is streamed.
    ///
    /// The gateway sends either a priority name or a number, so this is kept
    /// as a raw JSON value.
    #[serde(rename = "MinimumPriority", default)]
    pub minimum_priority: serde_json::Value,

    /// Alarm source filter.
    #[serde(rename = "Source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Alarm display path filter.
    #[serde(rename = "DispPath", default, skip_serializing_if = "Option::is_none")]
    pub display_path: Option<String>,

    /// Alarm source path filter.
    #[serde(rename = "SrcPath", default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

/// An output stream from the gateway to Kafka.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sink {
    #[serde(default)]
    pub stats: Vec<SinkStat>,
}

/// Delivery statistics for one source feeding a sink.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SinkStat {
    /// Name of the data source (tag provider, alarm pipeline, audit profile).
    #[serde(rename = "Source", default)]
    pub source: String,

    /// Messages handed to the producer successfully.
    #[serde(rename = "MessageCount", default)]
    pub message_count: u64,

    /// Messages the producer rejected.
    #[serde(rename = "FailedCount", default)]
    pub failed_count: u64,

    /// Timestamp of the last message, as formatted by the gateway.
    #[serde(rename = "LastMessageTime", default)]
    pub last_message_time: String,

    /// Days since the sink was started.
    #[serde(rename = "LifeSpan", default)]
    pub life_span_days: f64,

    /// Timestamp at which the sink was started.
    #[serde(rename = "Started", default)]
    pub start_time: String,
}

impl ConnectionStatus {
    /// Iterate over every stat of every sink, in sink order then stat order.
    pub fn stats(&self) -> impl Iterator<Item = &SinkStat> {
        self.sinks.iter().flatten().flat_map(|sink| sink.stats.iter())
    }
}
