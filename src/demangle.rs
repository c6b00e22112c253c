//! Demangler helpers for Rust and C++ (Itanium) symbols.

use once_cell::sync::Lazy;
use regex::Regex;

/// Itanium (GCC/Clang) ABI names: `_Z...`, including clone suffixes like `.cold`.
static RE_ITA_MANGLED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^_Z[a-zA-Z0-9_][a-zA-Z0-9_$.]*$"#).expect("valid itanium mangled regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolFlavor {
    Rust,
    Itanium,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemangleResult {
    pub original: String,
    pub demangled: String,
    pub flavor: SymbolFlavor,
}

pub fn detect_flavor(s: &str) -> SymbolFlavor {
    if rustc_demangle::try_demangle(s).is_ok() {
        return SymbolFlavor::Rust;
    }
    if RE_ITA_MANGLED.is_match(s) {
        return SymbolFlavor::Itanium;
    }
    SymbolFlavor::Unknown
}

/// Attempt to demangle a single symbol. Returns None when not recognized.
pub fn demangle_one(s: &str) -> Option<DemangleResult> {
    // Rust (v0 + legacy) demangler
    if let Ok(dm) = rustc_demangle::try_demangle(s) {
        return Some(DemangleResult {
            original: s.to_string(),
            demangled: format!("{:#}", dm),
            flavor: SymbolFlavor::Rust,
        });
    }
    // C++ (Itanium) demangler
    if RE_ITA_MANGLED.is_match(s) {
        if let Ok(sym) = cpp_demangle::Symbol::new(s) {
            return Some(DemangleResult {
                original: s.to_string(),
                demangled: sym.to_string(),
                flavor: SymbolFlavor::Itanium,
            });
        }
    }
    None
}

/// Demangled form of `s`, or `s` itself when it is not a mangled name.
pub fn demangle_or_original(s: &str) -> String {
    demangle_one(s)
        .map(|r| r.demangled)
        .unwrap_or_else(|| s.to_string())
}
