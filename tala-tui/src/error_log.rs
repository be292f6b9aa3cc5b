//! Process-wide store for structured validation failures.
//!
//! Only 422-equivalent payloads land here; generic failures stay in the
//! notification toast. Entries are kept in memory for the Error Log view and
//! mirrored to disk as JSON lines so a batch that failed overnight can still
//! be inspected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use tala_api::ApiError;
use tala_core::FormKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub at: DateTime<Utc>,
    pub form: FormKind,
    pub error: ApiError,
}

#[derive(Debug)]
pub struct ErrorLogStore {
    entries: Vec<ErrorLogEntry>,
    path: PathBuf,
}

impl ErrorLogStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            entries: Vec::new(),
            path,
        }
    }

    /// Append a structured validation failure. The disk mirror is best
    /// effort; an unwritable log file must not break the save flow.
    pub fn push(&mut self, form: FormKind, error: ApiError) {
        let entry = ErrorLogEntry {
            at: Utc::now(),
            form,
            error,
        };
        if let Err(err) = self.append_to_disk(&entry) {
            tracing::warn!("error log write failed: {err}");
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ErrorLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cleared at logout together with the session.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn append_to_disk(&self, entry: &ErrorLogEntry) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(entry)?;
        writeln!(file, "{line}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tala_api::ErrorCode;
    use tala_core::CellError;

    fn sample_error() -> ApiError {
        ApiError {
            code: ErrorCode::ValidationFailed,
            msg: "Validation failed".to_string(),
            errors: vec![CellError {
                row: 0,
                field: "area".to_string(),
                message: "required".to_string(),
            }],
        }
    }

    #[test]
    fn pushed_payload_is_kept_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ErrorLogStore::new(dir.path().join("errors.jsonl"));
        store.push(FormKind::Biodiversity12, sample_error());
        assert_eq!(store.len(), 1);
        assert_eq!(store.entries()[0].error, sample_error());
    }

    #[test]
    fn entries_are_mirrored_as_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.jsonl");
        let mut store = ErrorLogStore::new(path.clone());
        store.push(FormKind::Biodiversity12, sample_error());
        store.push(FormKind::Forestry5, sample_error());
        let contents = std::fs::read_to_string(path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: ErrorLogEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.form, FormKind::Biodiversity12);
    }

    #[test]
    fn clear_empties_memory_but_not_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.jsonl");
        let mut store = ErrorLogStore::new(path.clone());
        store.push(FormKind::Biodiversity20, sample_error());
        store.clear();
        assert!(store.is_empty());
        assert!(std::fs::read_to_string(path).unwrap().contains("area"));
    }
}
