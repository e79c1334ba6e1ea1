use std::fmt;

use crate::coerce::{CoercionError, Kind, NodeType};

/// One entry of a [`LoadReport`].
#[derive(Debug)]
#[non_exhaustive]
pub enum Diagnostic {
    /// The pretty-printed document, recorded when requested.
    ParsedDocument(String),

    RootNotObject { found: NodeType },

    MissingKey { key: String },

    /// The node's type has no coercion path to the setting's kind.
    TypeMismatch {
        key: String,
        expected: Kind,
        found: NodeType,
    },

    /// Coercion started but failed inside an element or object bind.
    Coercion { key: String, source: CoercionError },

    /// The node's type is one the loader never dispatches.
    InvalidType { key: String, found: NodeType },
}

impl Diagnostic {
    /// Whether this entry reports a problem, as opposed to informational output.
    pub fn is_warning(&self) -> bool {
        !matches!(self, Diagnostic::ParsedDocument(_))
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Diagnostic::MissingKey { key }
            | Diagnostic::TypeMismatch { key, .. }
            | Diagnostic::Coercion { key, .. }
            | Diagnostic::InvalidType { key, .. } => Some(key.as_str()),
            Diagnostic::ParsedDocument(_) | Diagnostic::RootNotObject { .. } => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ParsedDocument(text) => write!(f, "parsed document:\n{text}"),
            Diagnostic::RootNotObject { found } => {
                write!(f, "document root is {found}, expected object")
            }
            Diagnostic::MissingKey { key } => write!(f, "setting \"{key}\" not found in document"),
            Diagnostic::TypeMismatch {
                key,
                expected,
                found,
            } => write!(f, "type mismatch for \"{key}\": expected {expected}, found {found}"),
            Diagnostic::Coercion { key, source } => {
                write!(f, "failed to coerce \"{key}\": {source}")
            }
            Diagnostic::InvalidType { key, found } => {
                write!(f, "value of \"{key}\" has invalid type ({found})")
            }
        }
    }
}

/// The ordered log of a load pass.
///
/// A report may hold warnings even when the load succeeded; it is a log, not
/// an error channel.
#[derive(Debug, Default)]
pub struct LoadReport {
    diagnostics: Vec<Diagnostic>,
}

impl LoadReport {
    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn lines(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }

    pub fn text(&self) -> String {
        self.lines().join("\n")
    }

    /// Number of entries that report a problem.
    pub fn warnings(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    /// True when no problem was reported.
    pub fn is_clean(&self) -> bool {
        self.warnings() == 0
    }

    /// Keys that were absent from the document.
    pub fn missing_keys(&self) -> impl Iterator<Item = &str> {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::MissingKey { key } => Some(key.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}
