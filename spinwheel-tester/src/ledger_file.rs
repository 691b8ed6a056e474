//! JSON-file backed outcome ledger.
//!
//! The whole history lives in one JSON array file. Writes go through a
//! temporary sibling file and a rename so a crash mid-write never truncates
//! the existing ledger.

use std::fs;
use std::path::{Path, PathBuf};

use spinwheel_core::{HistoryEntry, LedgerStore};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerFileError {
    #[error("ledger io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Outcome ledger persisted as a single JSON array file.
#[derive(Debug, Clone)]
pub struct JsonFileLedger {
    path: PathBuf,
}

impl JsonFileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Vec<HistoryEntry>, LedgerFileError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_entries(&self, entries: &[HistoryEntry]) -> Result<(), LedgerFileError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LedgerStore for JsonFileLedger {
    type Error = LedgerFileError;

    fn append(&mut self, entry: &HistoryEntry) -> Result<(), Self::Error> {
        let mut entries = self.read_entries()?;
        entries.push(entry.clone());
        self.write_entries(&entries)
    }

    fn read_all(&self) -> Result<Vec<HistoryEntry>, Self::Error> {
        self.read_entries()
    }
}
