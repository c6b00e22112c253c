//! Exported-symbol extraction from built libraries.
//!
//! Parses the images directly with the `object` crate; no external `nm` is
//! required. ELF and Mach-O names come from the symbol tables, PE names from
//! the export directory.

use crate::config::{IoLimits, NmConfig};
use crate::demangle;
use crate::error::{Result, SmbchkError};
use crate::io;
use object::read::{Object, ObjectSymbol};
use object::BinaryFormat;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Collect the API symbols of every configured library under `prefix`.
pub fn nm<P: AsRef<Path>>(
    prefix: P,
    cfg: &NmConfig,
    limits: &IoLimits,
) -> Result<BTreeSet<String>> {
    let libs = find_libraries(prefix.as_ref(), cfg)?;
    let mut names = BTreeSet::new();
    for lib in &libs {
        let data = io::read_file_bounded(lib, limits)?;
        let found = extract_exports_named(&data, cfg, &lib.display().to_string())?;
        info!(library = %lib.display(), symbols = found.len(), "extracted API symbols");
        names.extend(found);
    }
    Ok(names)
}

/// Paths of the configured libraries that exist under `<prefix>/<lib_dir>`.
pub fn find_libraries(prefix: &Path, cfg: &NmConfig) -> Result<Vec<PathBuf>> {
    let dir = prefix.join(&cfg.lib_dir);
    let found: Vec<PathBuf> = cfg
        .libraries
        .iter()
        .map(|name| dir.join(name))
        .filter(|p| io::is_regular_file(p))
        .collect();
    if found.is_empty() {
        warn!(dir = %dir.display(), "no configured library present");
        return Err(SmbchkError::LibraryNotFound {
            dir,
            candidates: cfg.libraries.clone(),
        });
    }
    Ok(found)
}

/// Extract the demangled, API-filtered exports of an in-memory image.
pub fn extract_exports(data: &[u8], cfg: &NmConfig) -> Result<BTreeSet<String>> {
    extract_exports_named(data, cfg, "<memory>")
}

fn extract_exports_named(data: &[u8], cfg: &NmConfig, label: &str) -> Result<BTreeSet<String>> {
    let file = object::File::parse(data).map_err(|e| invalid(label, e))?;
    let strip_underscore = file.format() == BinaryFormat::MachO;

    let mut out = BTreeSet::new();
    for raw in exported_names(&file, label)? {
        let raw: &str = if strip_underscore {
            raw.strip_prefix('_').unwrap_or(&raw)
        } else {
            &raw
        };
        if raw.is_empty() {
            continue;
        }
        let name = demangle::demangle_or_original(raw);
        if cfg.is_api_symbol(&name) {
            out.insert(name);
        }
    }
    Ok(out)
}

/// Raw (still mangled) names the image exports.
fn exported_names<'data>(file: &object::File<'data>, label: &str) -> Result<Vec<Cow<'data, str>>> {
    // PE: the export directory is the only list of what a DLL exports.
    if file.format() == BinaryFormat::Pe {
        let exports = file.exports().map_err(|e| invalid(label, e))?;
        debug!(image = label, exports = exports.len(), "scanning export directory");
        return Ok(exports
            .iter()
            .map(|e| String::from_utf8_lossy(e.name()))
            .collect());
    }

    // Archives and relocatable objects carry no dynamic table.
    let use_dynamic = file.dynamic_symbols().next().is_some();
    let symbols = if use_dynamic {
        file.dynamic_symbols()
    } else {
        file.symbols()
    };
    debug!(image = label, dynamic = use_dynamic, "scanning symbol table");

    Ok(symbols
        .filter(|sym| sym.is_definition() && sym.is_global())
        .filter_map(|sym| sym.name().ok())
        .map(Cow::Borrowed)
        .collect())
}

fn invalid(label: &str, err: object::Error) -> SmbchkError {
    SmbchkError::InvalidFormat {
        path: label.to_string(),
        message: err.to_string(),
    }
}
