//! HistoryStore — append-only conversation log, one JSON record per line.
//!
//! Appends are crash-safe (append, flush, sync); wipes rewrite the file
//! atomically. History is never truncated by size — only the explicit wipe
//! operations remove entries. Unparseable lines are skipped with a warning
//! on read: history is log data, and one bad line should not hide the rest
//! of the conversation.

use chrono::{Duration, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

use quill_core::error::HistoryError;
use quill_core::storage::atomic_write;
use quill_core::HistoryEntry;

/// A session's history log bound to its backing file.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry: write the line, flush, sync. Monotonic — entries
    /// land in call order.
    pub fn append(&self, entry: &HistoryEntry) -> Result<(), HistoryError> {
        let storage_err = |reason: String| HistoryError::Storage {
            path: self.path.clone(),
            reason,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| storage_err(e.to_string()))?;
        }
        let line = serde_json::to_string(entry).map_err(|e| storage_err(e.to_string()))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| storage_err(e.to_string()))?;
        writeln!(file, "{line}").map_err(|e| storage_err(e.to_string()))?;
        file.flush().map_err(|e| storage_err(e.to_string()))?;
        file.sync_data().map_err(|e| storage_err(e.to_string()))
    }

    /// All entries in append order. A missing file is an empty log.
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(HistoryError::Storage {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<HistoryEntry>(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "skipping corrupt history line");
                    None
                }
            })
            .collect())
    }

    /// The last `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut entries = self.load()?;
        let skip = entries.len().saturating_sub(n);
        Ok(entries.split_off(skip))
    }

    pub fn len(&self) -> Result<usize, HistoryError> {
        Ok(self.load()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, HistoryError> {
        Ok(self.len()? == 0)
    }

    /// Remove the entire log.
    pub fn wipe(&self) -> Result<(), HistoryError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HistoryError::Storage {
                path: self.path.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Remove entries older than `max_age`, preserving the relative order
    /// of survivors. Returns how many entries were removed.
    pub fn wipe_older_than(&self, max_age: Duration) -> Result<usize, HistoryError> {
        let entries = self.load()?;
        let cutoff = Utc::now() - max_age;
        let survivors: Vec<&HistoryEntry> =
            entries.iter().filter(|e| e.timestamp >= cutoff).collect();
        let removed = entries.len() - survivors.len();
        if removed == 0 {
            return Ok(0);
        }

        let mut content = String::new();
        for entry in &survivors {
            let line = serde_json::to_string(entry).map_err(|e| HistoryError::Storage {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
            content.push_str(&line);
            content.push('\n');
        }
        atomic_write(&self.path, content.as_bytes()).map_err(|e| HistoryError::Storage {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(removed)
    }
}
