//! Activity log: one JSONL line per remote call, for diagnostics.
//!
//! Every store, auth and completion request is recorded with its outcome and
//! latency in `~/.aidash/activity.jsonl`. The dashboard never shows these
//! failures to the user; this log is where they end up.
//!
//! Logging is off until [`init`] turns it on, so library users and tests
//! don't write into the home directory unless asked to.

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable or disable the activity log for this process.
pub fn init(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

/// Whether entries are currently being written.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A single line of `~/.aidash/activity.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: String,
    /// `select`, `insert`, `update`, `delete`, `sign_in`, `sign_out`, `chat`, ...
    pub operation: String,
    /// Table name or endpoint.
    pub target: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Error chain for failures, or a short note.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Record the outcome of a remote call that started at `started`.
pub fn record<T>(operation: &str, target: &str, started: Instant, result: &Result<T>) {
    let detail = result.as_ref().err().map(|e| format!("{e:#}"));
    log_entry(
        operation,
        target,
        result.is_ok(),
        Some(started.elapsed().as_millis() as u64),
        detail,
    );
}

/// Record a free-form note (no latency), e.g. a skipped malformed row.
pub fn note(operation: &str, target: &str, success: bool, detail: impl Into<String>) {
    log_entry(operation, target, success, None, Some(detail.into()));
}

fn log_entry(
    operation: &str,
    target: &str,
    success: bool,
    latency_ms: Option<u64>,
    detail: Option<String>,
) {
    if !is_enabled() {
        return;
    }

    let entry = ActivityEntry {
        timestamp: Utc::now().to_rfc3339(),
        operation: operation.to_string(),
        target: target.to_string(),
        success,
        latency_ms,
        detail,
    };

    let _ = append_entry(&entry);
}

fn append_entry(entry: &ActivityEntry) -> Result<()> {
    let Some(path) = activity_log_path() else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read every entry, skipping malformed lines. Empty when there is no log.
pub fn read_all_entries() -> Vec<ActivityEntry> {
    let Some(path) = activity_log_path() else {
        return Vec::new();
    };

    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<ActivityEntry>(&line).ok())
        .collect()
}

/// Aggregate view of the activity log for `aidash health`.
#[derive(Debug, Default, PartialEq)]
pub struct ActivitySummary {
    pub entries: usize,
    pub failures: usize,
    pub avg_latency_ms: f64,
}

/// Summarise a set of entries.
pub fn summarize(entries: &[ActivityEntry]) -> ActivitySummary {
    let latencies: Vec<u64> = entries.iter().filter_map(|e| e.latency_ms).collect();
    let avg_latency_ms = if latencies.is_empty() {
        0.0
    } else {
        latencies.iter().sum::<u64>() as f64 / latencies.len() as f64
    };

    ActivitySummary {
        entries: entries.len(),
        failures: entries.iter().filter(|e| !e.success).count(),
        avg_latency_ms,
    }
}

/// Return the path to the activity log.
pub fn activity_log_path() -> Option<PathBuf> {
    crate::config::data_dir().map(|dir| dir.join("activity.jsonl"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(success: bool, latency_ms: Option<u64>) -> ActivityEntry {
        ActivityEntry {
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            operation: "select".to_string(),
            target: "ai_models".to_string(),
            success,
            latency_ms,
            detail: None,
        }
    }

    #[test]
    fn summarize_empty_log() {
        assert_eq!(summarize(&[]), ActivitySummary::default());
    }

    #[test]
    fn summarize_counts_failures_and_averages_latency() {
        let entries = vec![
            entry(true, Some(10)),
            entry(false, Some(30)),
            entry(true, None),
        ];
        let summary = summarize(&entries);
        assert_eq!(summary.entries, 3);
        assert_eq!(summary.failures, 1);
        assert!((summary.avg_latency_ms - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn entry_skips_empty_optionals() {
        let json = serde_json::to_string(&entry(true, None)).unwrap();
        assert!(!json.contains("latency_ms"));
        assert!(!json.contains("detail"));
    }

    #[test]
    fn entry_parses_without_detail() {
        let line = r#"{"timestamp":"t","operation":"chat","target":"/api/chat","success":false,"latency_ms":5}"#;
        let parsed: ActivityEntry = serde_json::from_str(line).unwrap();
        assert!(!parsed.success);
        assert!(parsed.detail.is_none());
    }
}
