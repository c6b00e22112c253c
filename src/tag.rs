//! Version tag lookup for new database records.

use crate::error::{Result, SmbchkError};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// `git describe --tags --always` run in `dir`.
pub fn git_describe<P: AsRef<Path>>(dir: P) -> Result<String> {
    let out = Command::new("git")
        .args(["describe", "--tags", "--always"])
        .current_dir(dir.as_ref())
        .output()
        .map_err(|e| SmbchkError::Tag(format!("could not run git: {e}")))?;
    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(SmbchkError::Tag(format!(
            "git describe failed: {}",
            stderr.trim()
        )));
    }
    let tag = String::from_utf8_lossy(&out.stdout).trim().to_string();
    normalize(&tag)
}

/// Accept an explicit tag, rejecting blank ones.
pub fn normalize(tag: &str) -> Result<String> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(SmbchkError::Tag("empty version tag".to_string()));
    }
    debug!(tag, "using version tag");
    Ok(tag.to_string())
}
