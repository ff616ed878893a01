//! Score bridge
//!
//! Moves choral and instrumental scores between MusicXML, a line-oriented
//! text form that a language model reads and writes, and back. Around the
//! round trip sit the pieces that keep model edits honest: a strict parser
//! with per-line diagnostics, stable event ids, a semantic diff, and a
//! validator that accepts a transformed score only when it stays inside the
//! granted change categories.
//!
//! Logging goes through the `log` facade; installing a logger is left to the
//! embedding program.

pub mod config;
pub mod converters;
pub mod diagnostics;
pub mod diff;
pub mod index;
pub mod models;
pub mod parse;
pub mod renderers;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use config::{ConfigError, Settings};
pub use converters::{
    export_musicxml_file, import_musicxml_file, import_musicxml_str, ExportError, ImportError, ImportReport,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use diff::{compute_semantic_diff, DiffEntry, SemanticDiff};
pub use index::EventIndex;
pub use models::core::*;
pub use models::elements::*;
pub use models::{Pitch, Rational, Step, TimeSignature};
pub use parse::parse_text;
pub use renderers::{to_helmholtz_text, to_text, TextFormError};
pub use validation::{validate_transformation, Category, TransformationValidator, ValidationReport};
