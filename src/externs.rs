//! Extern names (spec §3 "Extern declarations", §6 "Naming rules").
//!
//! Grounded on spec §6's prose description of interface-style names; there
//! is no teacher file that implements this (the teacher decodes names
//! already split into strings from a binary format), so this module is
//! built directly from the spec's own naming-rule prose, kept as a small,
//! independently testable unit per SPEC_FULL.md's "Strong name-uniqueness
//! checker" supplement.

use std::fmt;

/// An extra label attached to an interface-style name:
/// `[implements=<iface>]`, `[method]a.b`, `[static]a.b`, `[constructor]a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameLabel {
    Implements(String),
    Method,
    Static,
    Constructor,
}

/// A name at an import/export boundary: either a plain kebab-case
/// identifier, or an interface-style name `ns:pkg/path[@version]` plus the
/// labels that were attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExternName {
    Plain(String),
    Interface {
        namespace: String,
        package: String,
        path: String,
        version: Option<String>,
        labels: Vec<NameLabel>,
    },
}

impl ExternName {
    pub fn plain(s: impl Into<String>) -> Self {
        ExternName::Plain(s.into())
    }

    /// The raw textual form, ignoring labels — used for output and as the
    /// fallback comparison key when no stripping applies.
    pub fn raw(&self) -> String {
        match self {
            ExternName::Plain(s) => s.clone(),
            ExternName::Interface { namespace, package, path, version, .. } => {
                let mut s = format!("{namespace}:{package}/{path}");
                if let Some(v) = version {
                    s.push('@');
                    s.push_str(v);
                }
                s
            }
        }
    }
}

impl fmt::Display for ExternName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw())
    }
}
