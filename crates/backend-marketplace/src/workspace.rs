//! The user's own draft and published listings, kept in a local JSON file.

use std::path::{Path, PathBuf};

use atelier_model::RawRecord;
use serde_json::Value;

use crate::{parse_response, BackendError};

/// File-backed store of workspace records.
///
/// The file holds a JSON array of raw records. A missing file reads as an
/// empty workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    path: PathBuf,
}

impl WorkspaceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in the workspace.
    pub fn load(&self) -> Result<Vec<RawRecord>, BackendError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No workspace file");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let json: Value =
            serde_json::from_str(&text).map_err(|e| BackendError::ParseError(e.to_string()))?;
        match json {
            Value::Array(items) => Ok(items),
            other => Ok(parse_response(other)?.items),
        }
    }

    /// Replace the workspace contents.
    pub fn save(&self, records: &[RawRecord]) -> Result<(), BackendError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(records)
            .map_err(|e| BackendError::ParseError(e.to_string()))?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    /// Insert a record, replacing any record with the same `id` or `_id`.
    pub fn upsert(&self, record: RawRecord) -> Result<(), BackendError> {
        let mut records = self.load()?;
        let id = record_id(&record);
        match id.and_then(|id| records.iter().position(|r| record_id(r) == Some(id))) {
            Some(idx) => records[idx] = record,
            None => records.push(record),
        }
        self.save(&records)
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record
        .get("id")
        .or_else(|| record.get("_id"))
        .and_then(Value::as_str)
}
