//! Symbol database: the per-release history of exported API symbols.
//!
//! On disk this is a JSON array of version records, oldest first:
//!
//! ```json
//! [
//!   {"symbols": ["cyclus::Agent::Agent(cyclus::Context*)"], "version": "1.0", "date": "2014-07-01"}
//! ]
//! ```

use crate::error::{Result, SmbchkError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Symbols exported by one released version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub symbols: BTreeSet<String>,
    pub version: String,
    pub date: String,
}

impl VersionRecord {
    pub fn new<I, S>(symbols: I, version: impl Into<String>, date: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            version: version.into(),
            date: date.into(),
        }
    }

    /// Record stamped with today's local date.
    pub fn today(symbols: BTreeSet<String>, version: impl Into<String>) -> Self {
        Self {
            symbols,
            version: version.into(),
            date: chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
        }
    }
}

/// Ordered history of version records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolDatabase {
    entries: Vec<VersionRecord>,
}

impl SymbolDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a database from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let db: SymbolDatabase = serde_json::from_str(&text)?;
        info!(path = %path.display(), entries = db.len(), "loaded symbol database");
        Ok(db)
    }

    /// Write the database as pretty JSON, replacing `path` atomically.
    ///
    /// An existing file keeps its permissions; a symlink is followed and its
    /// target replaced, leaving the link in place.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let existing = std::fs::canonicalize(path).ok();
        let target = existing.as_deref().unwrap_or(path);
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.write_all(b"\n")?;
        if existing.is_some() {
            let perms = std::fs::metadata(target)?.permissions();
            tmp.as_file().set_permissions(perms)?;
        }
        tmp.persist(target).map_err(|e| SmbchkError::Io(e.error))?;
        info!(path = %path.display(), entries = self.len(), "saved symbol database");
        Ok(())
    }

    /// Append a record; a record with the same tag as the latest replaces it.
    pub fn push(&mut self, record: VersionRecord) {
        if let Some(last) = self.entries.last_mut() {
            if last.version == record.version {
                warn!(version = %record.version, "replacing latest record with same version tag");
                *last = record;
                return;
            }
        }
        debug!(version = %record.version, symbols = record.symbols.len(), "appending record");
        self.entries.push(record);
    }

    /// Map a possibly negative position onto an index; `-1` is the latest.
    pub fn resolve_index(&self, index: isize) -> Result<usize> {
        let len = self.entries.len();
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index as usize).filter(|&i| i < len)
        };
        resolved.ok_or(SmbchkError::IndexOutOfRange { index, len })
    }

    pub fn get(&self, index: isize) -> Result<&VersionRecord> {
        let i = self.resolve_index(index)?;
        Ok(&self.entries[i])
    }

    pub fn latest(&self) -> Option<&VersionRecord> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VersionRecord> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[VersionRecord] {
        &self.entries
    }
}

impl From<Vec<VersionRecord>> for SymbolDatabase {
    fn from(entries: Vec<VersionRecord>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a SymbolDatabase {
    type Item = &'a VersionRecord;
    type IntoIter = std::slice::Iter<'a, VersionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
