//! Symbol-set difference between two recorded versions.

use crate::db::{SymbolDatabase, VersionRecord};
use crate::error::Result;
use std::fmt;

/// Changes going from one database entry to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolDiff {
    /// `(version, date)` of side `i`, the base of the comparison
    pub from: (String, String),
    /// `(version, date)` of side `j`
    pub to: (String, String),
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl SymbolDiff {
    pub fn between(a: &VersionRecord, b: &VersionRecord) -> Self {
        Self {
            from: (a.version.clone(), a.date.clone()),
            to: (b.version.clone(), b.date.clone()),
            added: b.symbols.difference(&a.symbols).cloned().collect(),
            removed: a.symbols.difference(&b.symbols).cloned().collect(),
        }
    }

    /// Number of changed symbols.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Diff the entries at positions `i` and `j`; negative positions count from the end.
pub fn diff(db: &SymbolDatabase, i: isize, j: isize) -> Result<SymbolDiff> {
    Ok(SymbolDiff::between(db.get(i)?, db.get(j)?))
}

impl fmt::Display for SymbolDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} ({})", self.from.0, self.from.1)?;
        writeln!(f, "+++ {} ({})", self.to.0, self.to.1)?;

        let mut lines: Vec<(&str, char)> = self
            .removed
            .iter()
            .map(|s| (s.as_str(), '-'))
            .chain(self.added.iter().map(|s| (s.as_str(), '+')))
            .collect();
        lines.sort_unstable();
        for (sym, sign) in lines {
            writeln!(f, "{sign}{sym}")?;
        }
        Ok(())
    }
}
