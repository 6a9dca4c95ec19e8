//! File-based status fetcher.
//!
//! Reads a JSON status document from disk on every fetch. Useful for
//! replaying a saved gateway response or for driving the TUI offline.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{ConnectionStatus, FetchError, StatusFetcher};

/// A fetcher that reads status snapshots from a JSON file.
///
/// Unlike a watch on modification time, every fetch re-reads the file, so
/// each poll tick produces a fresh snapshot exactly like the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    path: PathBuf,
    description: String,
}

impl FileFetcher {
    /// Create a new file fetcher for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StatusFetcher for FileFetcher {
    async fn fetch(&self) -> Result<ConnectionStatus, FetchError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let status = serde_json::from_str(&content)?;
        Ok(status)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "Enabled": true,
            "count": 1,
            "connections": [
                { "Brokers": "localhost:9092", "isSSL": false }
            ],
            "sinks": [
                { "stats": [ { "Source": "default", "MessageCount": 5 } ] }
            ]
        }"#
    }

    #[test]
    fn test_file_fetcher_new() {
        let fetcher = FileFetcher::new("/tmp/status.json");
        assert_eq!(fetcher.path(), Path::new("/tmp/status.json"));
        assert_eq!(fetcher.description(), "file: /tmp/status.json");
    }

    #[tokio::test]
    async fn test_file_fetcher_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let fetcher = FileFetcher::new(file.path());
        let status = fetcher.fetch().await.unwrap();
        assert!(status.enabled);
        assert_eq!(status.count, 1);
        assert_eq!(status.stats().count(), 1);

        // Every fetch re-reads, even if nothing changed
        let again = fetcher.fetch().await.unwrap();
        assert_eq!(status, again);
    }

    #[tokio::test]
    async fn test_file_fetcher_missing_file() {
        let fetcher = FileFetcher::new("/nonexistent/path/status.json");

        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Read(_)));
        assert!(err.to_string().contains("Read error"));
    }

    #[tokio::test]
    async fn test_file_fetcher_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let fetcher = FileFetcher::new(file.path());

        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
        assert!(err.to_string().contains("Parse error"));
    }
}
