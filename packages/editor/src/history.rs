//! # History Log
//!
//! Bounded snapshot log used for undo.
//!
//! - Entries are full copies of the section list taken after a mutation,
//!   newest first, truncated to `capacity`.
//! - Recording is throttled: a record within `throttle_ms` of the previous
//!   one is skipped.
//! - Every change is persisted through a [`HistoryStorage`]. When storage
//!   reports its quota is exhausted the log is cleared and one retry is made
//!   with only the fresh entry. If that fails too the log gives up and stays
//!   empty.
//! - Undo restores `entries[1]` and drops the newest entry. There is no redo.

use crate::errors::HistoryStorageError;
use blocksmith_model::{HistoryEntry, Section};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryConfig {
    pub capacity: usize,
    pub throttle_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            throttle_ms: 1000,
        }
    }
}

/// Where history entries are persisted
pub trait HistoryStorage: Send {
    fn save(&mut self, entries: &[HistoryEntry]) -> Result<(), HistoryStorageError>;

    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryStorageError>;
}

/// In-memory storage with an optional quota on the serialized JSON size
#[derive(Debug, Default)]
pub struct MemoryHistoryStorage {
    quota_bytes: Option<usize>,
    entries: Vec<HistoryEntry>,
}

impl MemoryHistoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Default::default()
        }
    }
}

impl HistoryStorage for MemoryHistoryStorage {
    fn save(&mut self, entries: &[HistoryEntry]) -> Result<(), HistoryStorageError> {
        if let Some(quota) = self.quota_bytes {
            let needed = serde_json::to_vec(entries)?.len();
            if needed > quota {
                return Err(HistoryStorageError::QuotaExceeded { needed, quota });
            }
        }
        self.entries = entries.to_vec();
        Ok(())
    }

    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryStorageError> {
        Ok(self.entries.clone())
    }
}

/// Result of a record attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// Within the throttle window of the previous record
    Throttled,
    /// Quota was exhausted; the log now holds only the fresh entry
    Recovered,
    /// Storage kept failing
    Failed,
}

pub struct HistoryLog {
    config: HistoryConfig,
    storage: Box<dyn HistoryStorage>,
    entries: Vec<HistoryEntry>,
    last_recorded: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for HistoryLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLog")
            .field("config", &self.config)
            .field("entries", &self.entries.len())
            .field("last_recorded", &self.last_recorded)
            .finish()
    }
}

impl HistoryLog {
    pub fn new(config: HistoryConfig, storage: Box<dyn HistoryStorage>) -> Self {
        Self {
            config,
            storage,
            entries: Vec::new(),
            last_recorded: None,
        }
    }

    /// Log backed by storage, starting from whatever it already holds
    pub fn load(config: HistoryConfig, storage: Box<dyn HistoryStorage>) -> Result<Self, HistoryStorageError> {
        let mut entries = storage.load()?;
        entries.truncate(config.capacity);
        Ok(Self {
            config,
            storage,
            entries,
            last_recorded: None,
        })
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Newest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.entries.len() > 1
    }

    /// Replace the in-memory entries without persisting or touching the
    /// throttle clock
    pub fn restore(&mut self, mut entries: Vec<HistoryEntry>) {
        entries.truncate(self.config.capacity);
        self.entries = entries;
    }

    /// Baseline entry for a freshly opened project. Does not start the
    /// throttle window.
    pub fn seed(&mut self, sections: &[Section], now: DateTime<Utc>) -> RecordOutcome {
        self.push(HistoryEntry::snapshot("Open project", sections, now))
    }

    /// Snapshot `sections` under `action`
    pub fn record(&mut self, action: &str, sections: &[Section], now: DateTime<Utc>) -> RecordOutcome {
        if let Some(last) = self.last_recorded {
            if now - last < Duration::milliseconds(self.config.throttle_ms as i64) {
                debug!(action, "History record throttled");
                return RecordOutcome::Throttled;
            }
        }
        self.last_recorded = Some(now);
        self.push(HistoryEntry::snapshot(action, sections, now))
    }

    /// Drop the newest entry and return the sections of the one before it
    pub fn undo(&mut self) -> Option<Vec<Section>> {
        if !self.can_undo() {
            return None;
        }
        self.entries.remove(0);
        let sections = self.entries[0].sections.clone();
        if let Err(e) = self.storage.save(&self.entries) {
            warn!(error = %e, "Failed to persist history after undo");
        }
        Some(sections)
    }

    fn push(&mut self, entry: HistoryEntry) -> RecordOutcome {
        self.entries.insert(0, entry);
        self.entries.truncate(self.config.capacity.max(1));

        match self.storage.save(&self.entries) {
            Ok(()) => RecordOutcome::Recorded,
            Err(HistoryStorageError::QuotaExceeded { needed, quota }) => {
                warn!(needed, quota, "History quota exceeded, clearing log");
                self.entries.truncate(1);
                match self.storage.save(&self.entries) {
                    Ok(()) => RecordOutcome::Recovered,
                    Err(e) => {
                        warn!(error = %e, "History still does not fit, giving up");
                        self.entries.clear();
                        RecordOutcome::Failed
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to persist history");
                RecordOutcome::Failed
            }
        }
    }
}
