//! On-disk query history.
//!
//! A JSON file in the home directory recording every executed statement.
//! Unreadable or corrupt files degrade to an empty history rather than
//! failing startup.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

const HISTORY_FILE: &str = ".sqlpilot_history.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub success: bool,
}

pub struct QueryHistory {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl QueryHistory {
    pub fn new() -> Self {
        Self::at(default_path())
    }

    pub fn at(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "Corrupt history file, starting fresh");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        Self { path, entries }
    }

    pub fn add_query(&mut self, query: &str, success: bool) {
        self.entries.push(HistoryEntry {
            timestamp: Utc::now(),
            query: query.to_string(),
            success,
        });
        self.save();
    }

    /// The most recent entries, oldest first.
    pub fn recent(&self, limit: usize) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(limit);
        &self.entries[start..]
    }

    fn save(&self) {
        match serde_json::to_string_pretty(&self.entries) {
            Ok(text) => {
                if let Err(err) = fs::write(&self.path, text) {
                    warn!(path = %self.path.display(), error = %err, "Failed to save query history");
                }
            }
            Err(err) => warn!(error = %err, "Failed to serialize query history"),
        }
    }
}

impl Default for QueryHistory {
    fn default() -> Self {
        Self::new()
    }
}

fn default_path() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(HISTORY_FILE)
}
