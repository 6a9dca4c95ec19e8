//! Layered configuration.
//!
//! Settings are read, lowest precedence first, from built-in defaults, an
//! optional TOML file, and `SINKWATCH__*` environment variables. Command
//! line flags are applied on top by the binary.
//!
//! ```toml
//! [gateway]
//! url = "http://localhost:8088"
//! status_path = "/data/kafka/connections/status"
//! timeout_ms = 4000
//!
//! [poll]
//! interval_ms = 5000
//!
//! [log]
//! level = "info"
//! file = "sinkwatch.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::Level;

use crate::poller::DEFAULT_POLL_INTERVAL;
use crate::source::DEFAULT_STATUS_PATH;

/// Environment variable prefix, e.g. `SINKWATCH__GATEWAY__URL`.
const ENV_PREFIX: &str = "SINKWATCH";

/// All runtime settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub gateway: GatewaySettings,
    pub poll: PollSettings,
    pub log: LogSettings,
}

/// Where and how to reach the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    /// Gateway base URL.
    pub url: String,
    /// Path of the status route on the gateway.
    pub status_path: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollSettings {
    /// Time between fetches in milliseconds.
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Default level for this crate's events; `RUST_LOG` takes precedence.
    pub level: String,
    /// Log file. Logs are discarded when unset, since the TUI owns the terminal.
    pub file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from defaults, an optional file, and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("gateway.url", "http://localhost:8088")?
            .set_default("gateway.status_path", DEFAULT_STATUS_PATH)?
            .set_default("gateway.timeout_ms", 4000)?
            .set_default("poll.interval_ms", DEFAULT_POLL_INTERVAL.as_millis() as i64)?
            .set_default("log.level", "info")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
            .build()?
            .try_deserialize::<Self>()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check values that would only fail later, deep inside the poller or
    /// logging setup. Call again after applying command line overrides.
    pub fn validate(&self) -> Result<()> {
        if self.poll.interval_ms == 0 {
            bail!("poll.interval_ms must be greater than zero");
        }
        if self.gateway.timeout_ms == 0 {
            bail!("gateway.timeout_ms must be greater than zero");
        }
        self.log_level()?;
        Ok(())
    }

    /// Parsed `log.level`.
    pub fn log_level(&self) -> Result<Level> {
        self.log
            .level
            .parse::<Level>()
            .with_context(|| format!("invalid log.level {:?}", self.log.level))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.gateway.timeout_ms)
    }
}
