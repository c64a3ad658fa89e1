//! Operation log service
//!
//! Records what the user did (login, registration, ...) newest first, bounded
//! by a capacity. The log is an ordinary value owned by whoever creates it and
//! handed to consumers as `Arc<OperationLog>`; nothing here is global.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Kind of user operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Scan,
    ViewInsight,
    Favorite,
    Unfavorite,
    Chat,
    Login,
    Logout,
    Register,
    UpdateProfile,
    UpdatePreferences,
    ClearHistory,
    DeleteHistory,
    Other,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationEntry {
    pub id: String,
    pub kind: OperationKind,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

pub struct OperationLog {
    entries: RwLock<Vec<OperationEntry>>,
    capacity: usize,
    /// Backing file; `None` keeps the log in memory only
    path: Option<PathBuf>,
}

impl OperationLog {
    /// In-memory log
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            capacity,
            path: None,
        }
    }

    /// Log persisted to `path`. Existing entries are loaded now; a missing or
    /// unreadable file starts an empty log.
    pub fn persistent(capacity: usize, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut entries = load_entries(&path);
        entries.truncate(capacity);
        Self {
            entries: RwLock::new(entries),
            capacity,
            path: Some(path),
        }
    }

    /// Record an operation and return the stored entry
    pub fn record(
        &self,
        kind: OperationKind,
        description: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> OperationEntry {
        let entry = OperationEntry {
            id: format!("log_{}", uuid::Uuid::new_v4().simple()),
            kind,
            description: description.into(),
            timestamp: Utc::now(),
            metadata,
        };
        tracing::debug!(kind = ?entry.kind, "operation recorded: {}", entry.description);

        {
            let mut entries = self.entries.write();
            entries.insert(0, entry.clone());
            entries.truncate(self.capacity);
        }
        self.save();
        entry
    }

    /// All entries, newest first
    pub fn entries(&self) -> Vec<OperationEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn by_kind(&self, kind: OperationKind) -> Vec<OperationEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// Entries with `start <= timestamp <= end`
    pub fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<OperationEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.timestamp >= start && e.timestamp <= end)
            .cloned()
            .collect()
    }

    /// Remove one entry; returns whether it existed
    pub fn delete(&self, id: &str) -> bool {
        let removed = {
            let mut entries = self.entries.write();
            let before = entries.len();
            entries.retain(|e| e.id != id);
            entries.len() != before
        };
        if removed {
            self.save();
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.write().clear();
        self.save();
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&*self.entries.read())
    }

    /// Write entries to the backing file. Failures are logged, never returned.
    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let result = self
            .export_json()
            .map_err(anyhow::Error::from)
            .and_then(|json| {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, json)?;
                Ok(())
            });
        if let Err(err) = result {
            tracing::warn!("Failed to save operation log to {}: {err:#}", path.display());
        }
    }
}

fn load_entries(path: &Path) -> Vec<OperationEntry> {
    if !path.exists() {
        return Vec::new();
    }
    let parsed = fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|content| Ok(serde_json::from_str::<Vec<OperationEntry>>(&content)?));
    match parsed {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!("Failed to load operation log from {}: {err:#}", path.display());
            Vec::new()
        }
    }
}
