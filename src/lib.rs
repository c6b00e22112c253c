//! Symbol-compatibility checking for native C++ libraries.
//!
//! Records the exported API of each release in a JSON symbol database and
//! flags any build that drops a symbol an earlier release exported.

pub mod check;
pub mod config;
pub mod db;
pub mod demangle;
pub mod diff;
pub mod error;
pub mod io;
pub mod logging;
pub mod nm;
pub mod tag;

pub use check::{check, ApiBreak, CheckReport};
pub use config::{IoLimits, NmConfig, SmbchkConfig};
pub use db::{SymbolDatabase, VersionRecord};
pub use diff::{diff, SymbolDiff};
pub use error::{Result, SmbchkError};
pub use nm::nm;
