//! Backward-compatibility verdict for the most recent recorded version.
//!
//! The latest entry must export every symbol that any earlier entry exported,
//! not only those of the entry right before it.

use crate::db::SymbolDatabase;
use serde::Serialize;
use tracing::{info, warn};

/// Symbols from one earlier version that the latest version no longer exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiBreak {
    pub version: String,
    pub date: String,
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Version tag of the entry under test; `None` for an empty database
    pub latest: Option<String>,
    pub breaks: Vec<ApiBreak>,
}

impl CheckReport {
    /// True when the latest version only adds to the API.
    pub fn is_compatible(&self) -> bool {
        self.breaks.is_empty()
    }
}

/// Compare the latest entry against every earlier one.
pub fn check(db: &SymbolDatabase) -> CheckReport {
    let Some((latest, history)) = db.entries().split_last() else {
        return CheckReport::default();
    };
    let breaks: Vec<ApiBreak> = history
        .iter()
        .filter_map(|entry| {
            let removed: Vec<String> = entry
                .symbols
                .difference(&latest.symbols)
                .cloned()
                .collect();
            if removed.is_empty() {
                return None;
            }
            warn!(
                latest = %latest.version,
                since = %entry.version,
                removed = removed.len(),
                "API break: symbols removed"
            );
            Some(ApiBreak {
                version: entry.version.clone(),
                date: entry.date.clone(),
                removed,
            })
        })
        .collect();

    if breaks.is_empty() {
        info!(latest = %latest.version, history = history.len(), "API is backward compatible");
    }
    CheckReport {
        latest: Some(latest.version.clone()),
        breaks,
    }
}
