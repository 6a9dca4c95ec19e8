//! Historical tracking of sink message counts.
//!
//! Records the message count of every sink stat source across polls to
//! derive send rates and sparkline trends for the stats table.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use crate::source::ConnectionStatus;

/// Maximum number of historical samples to keep per source.
const MAX_HISTORY_SIZE: usize = 60;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One recorded message count.
#[derive(Debug, Clone, Copy)]
struct Sample {
    at: Instant,
    sent: u64,
}

/// Tracks message counts over time for each stat source.
#[derive(Debug, Clone, Default)]
pub struct History {
    samples: HashMap<String, VecDeque<Sample>>,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the stats of a snapshot taken at `at`.
    ///
    /// A count lower than the previous sample means the sink was reset, so
    /// the history for that source starts over.
    pub fn record(&mut self, status: &ConnectionStatus, at: Instant) {
        for stat in status.stats() {
            let samples = self.samples.entry(stat.source.clone()).or_default();
            if samples.back().is_some_and(|last| stat.message_count < last.sent) {
                samples.clear();
            }
            samples.push_back(Sample {
                at,
                sent: stat.message_count,
            });
            if samples.len() > MAX_HISTORY_SIZE {
                samples.pop_front();
            }
        }
    }

    /// Number of samples held for a source.
    pub fn sample_count(&self, source: &str) -> usize {
        self.samples.get(source).map_or(0, VecDeque::len)
    }

    /// Messages per second between the two most recent samples.
    ///
    /// Returns None if there's not enough history to calculate a rate.
    pub fn message_rate(&self, source: &str) -> Option<f64> {
        let samples = self.samples.get(source)?;
        if samples.len() < 2 {
            return None;
        }

        let current = samples.back()?;
        let previous = samples.get(samples.len() - 2)?;
        let elapsed = current.at.duration_since(previous.at).as_secs_f64();

        if elapsed > 0.0 {
            Some((current.sent - previous.sent) as f64 / elapsed)
        } else {
            None
        }
    }

    /// Sparkline of per-sample deltas (normalized to 0-7 for 8 bar levels).
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn sparkline_levels(&self, source: &str) -> Vec<u8> {
        let Some(samples) = self.samples.get(source) else {
            return Vec::new();
        };

        let deltas: Vec<u64> = samples
            .iter()
            .zip(samples.iter().skip(1))
            .map(|(a, b)| b.sent - a.sent)
            .collect();

        let Some(&max) = deltas.iter().max() else {
            return Vec::new();
        };
        let max = max.max(1);

        deltas.iter().map(|&d| (d.saturating_mul(7) / max).min(7) as u8).collect()
    }

    /// Sparkline of the most recent `width` deltas as text.
    pub fn sparkline(&self, source: &str, width: usize) -> String {
        let levels = self.sparkline_levels(source);
        let skip = levels.len().saturating_sub(width);
        levels[skip..].iter().map(|&l| SPARKLINE_CHARS[l as usize]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Sink, SinkStat};
    use std::time::Duration;

    fn status(counts: &[(&str, u64)]) -> ConnectionStatus {
        ConnectionStatus {
            count: 1,
            sinks: Some(vec![Sink {
                stats: counts
                    .iter()
                    .map(|(source, sent)| SinkStat {
                        source: source.to_string(),
                        message_count: *sent,
                        ..Default::default()
                    })
                    .collect(),
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_rate_needs_two_samples() {
        let mut history = History::new();
        let t0 = Instant::now();
        history.record(&status(&[("default", 100)]), t0);
        assert_eq!(history.message_rate("default"), None);
        assert_eq!(history.message_rate("unknown"), None);

        history.record(&status(&[("default", 150)]), t0 + Duration::from_secs(5));
        assert_eq!(history.message_rate("default"), Some(10.0));
    }

    #[test]
    fn test_reset_clears_history() {
        let mut history = History::new();
        let t0 = Instant::now();
        history.record(&status(&[("default", 500)]), t0);
        history.record(&status(&[("default", 600)]), t0 + Duration::from_secs(1));
        assert_eq!(history.sample_count("default"), 2);

        // Counter went backwards: the sink restarted
        history.record(&status(&[("default", 10)]), t0 + Duration::from_secs(2));
        assert_eq!(history.sample_count("default"), 1);
        assert_eq!(history.message_rate("default"), None);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = History::new();
        let t0 = Instant::now();
        for i in 0..(MAX_HISTORY_SIZE as u64 + 10) {
            history.record(&status(&[("default", i)]), t0 + Duration::from_secs(i));
        }
        assert_eq!(history.sample_count("default"), MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_sparkline() {
        let mut history = History::new();
        let t0 = Instant::now();
        for (i, sent) in [0u64, 10, 30, 30, 100].iter().enumerate() {
            history.record(&status(&[("default", *sent)]), t0 + Duration::from_secs(i as u64));
        }

        // Deltas 10, 20, 0, 70 scaled against 70
        assert_eq!(history.sparkline_levels("default"), vec![1, 2, 0, 7]);
        assert_eq!(history.sparkline("default", 2), "▁█");
        assert_eq!(history.sparkline("missing", 8), "");
    }

    #[test]
    fn test_sources_tracked_independently() {
        let mut history = History::new();
        let t0 = Instant::now();
        history.record(&status(&[("tags", 0), ("alarms", 0)]), t0);
        history.record(
            &status(&[("tags", 20), ("alarms", 2)]),
            t0 + Duration::from_secs(2),
        );
        assert_eq!(history.message_rate("tags"), Some(10.0));
        assert_eq!(history.message_rate("alarms"), Some(1.0));
    }
}
