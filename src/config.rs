//! Configuration for symbol extraction and bounded file access.
//!
//! Every field has a default matching the layout of a standard cyclus
//! install; a JSON file may override any subset of them.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Master configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmbchkConfig {
    /// Symbol extraction configuration.
    pub nm: NmConfig,
    /// I/O limits for reading binaries.
    pub io: IoLimits,
}

impl SmbchkConfig {
    /// Load a configuration from a JSON file. Missing fields keep defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Where to find the libraries and which of their symbols form the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NmConfig {
    /// Directory under the prefix holding the libraries
    pub lib_dir: String,
    /// Library file names to inspect; each one present is used
    pub libraries: Vec<String>,
    /// A demangled name must start with one of these to count as API
    pub api_prefixes: Vec<String>,
    /// Demangled names starting with any of these are dropped
    pub ignore_prefixes: Vec<String>,
}

impl Default for NmConfig {
    fn default() -> Self {
        Self {
            lib_dir: "lib".to_string(),
            libraries: vec!["libcyclus.so".to_string(), "libcyclus.dylib".to_string()],
            api_prefixes: vec!["cyclus::".to_string()],
            ignore_prefixes: Vec::new(),
        }
    }
}

impl NmConfig {
    /// Whether a demangled name belongs to the tracked API.
    pub fn is_api_symbol(&self, name: &str) -> bool {
        self.api_prefixes.iter().any(|p| name.starts_with(p.as_str()))
            && !self
                .ignore_prefixes
                .iter()
                .any(|p| name.starts_with(p.as_str()))
    }
}

/// Resource limits for reading binaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoLimits {
    pub max_read_bytes: u64,
}

impl Default for IoLimits {
    fn default() -> Self {
        Self {
            max_read_bytes: 512 * 1024 * 1024, // 512MB
        }
    }
}
