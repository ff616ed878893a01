//! Diagnostics collected while parsing the text form
//!
//! The parser never stops at the first problem: every line is checked and
//! every finding lands here, so the caller (and the model it re-prompts)
//! sees the complete list at once. Messages are written for end users and
//! name the category in plain words, which lets a reader tell a formatting
//! slip from musically corrupt content without looking at the kind field.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What went wrong, broadly
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// Malformed line, bad token, bad numeric literal
    Format,
    /// Missing or empty container, duplicate block
    Structure,
    /// Overlap, capacity breach, negative or empty time values
    Musical,
}

impl DiagnosticKind {
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::Format => "format error",
            DiagnosticKind::Structure => "structure error",
            DiagnosticKind::Musical => "musical error",
        }
    }
}

/// One finding, tied to a 1-based line of the input
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self { line, kind, message: message.into() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}: {}", self.line, self.kind.label(), self.message)
    }
}

/// Collection of diagnostics for one parse
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn add(&mut self, line: usize, kind: DiagnosticKind, message: impl Into<String>) {
        self.entries.push(Diagnostic::new(line, kind, message));
    }

    pub fn format(&mut self, line: usize, message: impl Into<String>) {
        self.add(line, DiagnosticKind::Format, message);
    }

    pub fn structure(&mut self, line: usize, message: impl Into<String>) {
        self.add(line, DiagnosticKind::Structure, message);
    }

    pub fn musical(&mut self, line: usize, message: impl Into<String>) {
        self.add(line, DiagnosticKind::Musical, message);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn has_kind(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|d| d.kind == kind)
    }

    /// Rendered messages, in input order
    pub fn messages(&self) -> Vec<String> {
        let mut sorted: Vec<&Diagnostic> = self.entries.iter().collect();
        sorted.sort_by_key(|d| d.line);
        sorted.into_iter().map(|d| d.to_string()).collect()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("\n"))
    }
}

impl std::error::Error for Diagnostics {}
