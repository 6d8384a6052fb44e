//! Metric History
//!
//! Keeps the value and status of every metric per report run in a JSON
//! file, for trend graphs and "status since" dates.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::engine::metric::meta::MetaKind;
use crate::engine::metric::Status;

pub const HISTORY_FILE: &str = "history.json";

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to access history: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid history format: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HistoryError>;

/// Where the history lives and how much of it to keep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Relative paths are resolved against the project folder
    #[serde(default = "default_file")]
    pub file: PathBuf,
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

fn default_file() -> PathBuf {
    PathBuf::from(HISTORY_FILE)
}

fn default_max_records() -> usize {
    1000
}

fn default_retention_days() -> i64 {
    730
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            file: default_file(),
            max_records: default_max_records(),
            retention_days: default_retention_days(),
        }
    }
}

/// Value and status of one metric in one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// None when the metric could not be measured
    pub value: Option<f64>,
    pub status: Status,
}

/// All metrics of one run, keyed by stable id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: DateTime<Utc>,
    pub values: BTreeMap<String, HistoryEntry>,
}

/// Start of the current status run of a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSince {
    pub date: DateTime<Utc>,
    /// The run goes back to the oldest retained record, so the status may be older
    pub is_lower_bound: bool,
}

/// Status percentages of one run, read from the meta metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetaTrendPoint {
    pub date: DateTime<Utc>,
    pub green: f64,
    pub yellow: f64,
    pub red: f64,
    pub grey: f64,
}

pub struct History {
    path: PathBuf,
    config: HistoryConfig,
    records: Vec<HistoryRecord>,
}

impl History {
    /// Empty history that is not backed by a file yet
    pub fn new(path: &Path, config: HistoryConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            config,
            records: Vec::new(),
        }
    }

    /// Load the history; a missing file is an empty history
    pub fn load(path: &Path, config: HistoryConfig) -> Result<Self> {
        let mut history = Self::new(path, config);
        if !path.exists() {
            debug!(path = %path.display(), "no history found, starting empty");
            return Ok(history);
        }
        let content = fs::read_to_string(path)?;
        let mut records: Vec<HistoryRecord> = serde_json::from_str(&content)?;
        records.sort_by_key(|r| r.date);
        debug!(path = %path.display(), records = records.len(), "history loaded");
        history.records = records;
        Ok(history)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string(&self.records)?;
        fs::write(&self.path, content)?;
        info!(path = %self.path.display(), records = self.records.len(), "history saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Add the values of a run and apply the retention limits
    pub fn add_record(&mut self, date: DateTime<Utc>, values: BTreeMap<String, HistoryEntry>) {
        let position = self.records.partition_point(|r| r.date <= date);
        self.records.insert(position, HistoryRecord { date, values });
        self.apply_retention(date);
    }

    fn apply_retention(&mut self, now: DateTime<Utc>) {
        let before = self.records.len();
        let oldest = now - Duration::days(self.config.retention_days);
        self.records.retain(|r| r.date >= oldest);
        if self.records.len() > self.config.max_records {
            let excess = self.records.len() - self.config.max_records;
            self.records.drain(..excess);
        }
        let dropped = before - self.records.len();
        if dropped > 0 {
            debug!(dropped, "history records dropped by retention");
        }
    }

    /// The last `n` measured values of a metric, oldest first
    pub fn recent_values(&self, stable_id: &str, n: usize) -> Vec<f64> {
        let mut values: Vec<f64> = self
            .records
            .iter()
            .rev()
            .filter_map(|r| r.values.get(stable_id).and_then(|e| e.value))
            .take(n)
            .collect();
        values.reverse();
        values
    }

    /// Since when a metric has had `status` without interruption
    pub fn status_start_date(&self, stable_id: &str, status: Status, now: DateTime<Utc>) -> StatusSince {
        let mut since = StatusSince {
            date: now,
            is_lower_bound: false,
        };
        for (index, record) in self.records.iter().enumerate().rev() {
            match record.values.get(stable_id) {
                Some(entry) if entry.status == status => {
                    since.date = record.date;
                    since.is_lower_bound = index == 0;
                }
                _ => break,
            }
        }
        since
    }

    /// Percentage of metrics per status for each run with meta metrics
    pub fn meta_trend(&self) -> Vec<MetaTrendPoint> {
        let value = |record: &HistoryRecord, kind: MetaKind| {
            record
                .values
                .get(kind.kind_name())
                .and_then(|entry| entry.value)
        };
        self.records
            .iter()
            .filter_map(|record| {
                let green = value(record, MetaKind::Green)?;
                let red = value(record, MetaKind::Red)?;
                let yellow =
                    value(record, MetaKind::Yellow).unwrap_or(100.0 - green - red);
                let grey = value(record, MetaKind::Grey).unwrap_or(0.0);
                Some(MetaTrendPoint {
                    date: record.date,
                    green,
                    yellow,
                    red,
                    grey,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
    }

    fn entry(value: f64, status: Status) -> BTreeMap<String, HistoryEntry> {
        BTreeMap::from([(
            "OpenBugs".to_string(),
            HistoryEntry {
                value: Some(value),
                status,
            },
        )])
    }

    fn history() -> History {
        History::new(Path::new(HISTORY_FILE), HistoryConfig::default())
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join(HISTORY_FILE);
        let mut history = History::new(&path, HistoryConfig::default());
        history.add_record(day(1), entry(3.0, Status::Green));
        history.save().unwrap();

        let loaded = History::load(&path, HistoryConfig::default()).unwrap();
        assert_eq!(loaded.records(), history.records());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let history = History::load(&dir.path().join(HISTORY_FILE), HistoryConfig::default()).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_recent_values() {
        let mut history = history();
        for d in 1..=5 {
            history.add_record(day(d), entry(f64::from(d), Status::Green));
        }
        assert_eq!(history.recent_values("OpenBugs", 3), vec![3.0, 4.0, 5.0]);
        assert!(history.recent_values("Unknown", 3).is_empty());
    }

    #[test]
    fn test_status_start_date() {
        let mut history = history();
        history.add_record(day(1), entry(60.0, Status::Yellow));
        history.add_record(day(2), entry(10.0, Status::Green));
        history.add_record(day(3), entry(12.0, Status::Green));

        let since = history.status_start_date("OpenBugs", Status::Green, day(4));
        assert_eq!(since.date, day(2));
        assert!(!since.is_lower_bound);

        // Status differs from the latest record
        let since = history.status_start_date("OpenBugs", Status::Red, day(4));
        assert_eq!(since.date, day(4));
    }

    #[test]
    fn test_status_start_date_at_least() {
        let mut history = history();
        history.add_record(day(1), entry(10.0, Status::Green));
        history.add_record(day(2), entry(10.0, Status::Green));
        let since = history.status_start_date("OpenBugs", Status::Green, day(3));
        assert_eq!(since.date, day(1));
        assert!(since.is_lower_bound);
    }

    #[test]
    fn test_retention_max_records() {
        let config = HistoryConfig {
            max_records: 2,
            ..HistoryConfig::default()
        };
        let mut history = History::new(Path::new(HISTORY_FILE), config);
        for d in 1..=4 {
            history.add_record(day(d), entry(1.0, Status::Green));
        }
        assert_eq!(history.records().len(), 2);
        assert_eq!(history.records()[0].date, day(3));
    }

    #[test]
    fn test_retention_days() {
        let config = HistoryConfig {
            retention_days: 2,
            ..HistoryConfig::default()
        };
        let mut history = History::new(Path::new(HISTORY_FILE), config);
        history.add_record(day(1), entry(1.0, Status::Green));
        history.add_record(day(5), entry(1.0, Status::Green));
        assert_eq!(history.records().len(), 1);
    }

    #[test]
    fn test_meta_trend_fallbacks() {
        let mut history = history();
        let meta = |id: &str, value: f64| {
            (
                id.to_string(),
                HistoryEntry {
                    value: Some(value),
                    status: Status::Green,
                },
            )
        };
        history.add_record(
            day(1),
            BTreeMap::from([meta("GreenMetaMetric", 70.0), meta("RedMetaMetric", 10.0)]),
        );
        history.add_record(
            day(2),
            BTreeMap::from([
                meta("GreenMetaMetric", 80.0),
                meta("RedMetaMetric", 5.0),
                meta("YellowMetaMetric", 10.0),
                meta("GreyMetaMetric", 5.0),
            ]),
        );
        history.add_record(day(3), entry(1.0, Status::Green));

        let trend = history.meta_trend();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].yellow, 20.0);
        assert_eq!(trend[0].grey, 0.0);
        assert_eq!(trend[1].grey, 5.0);
    }
}
