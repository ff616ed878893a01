//! Error types for notation import and export
//!
//! Only whole-document failures are errors. Content the importer cannot carry
//! over is skipped per voice and measure and listed in the import report.

use thiserror::Error;

/// Fatal import failures
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Not well-formed XML
    #[error("Invalid XML: {0}")]
    InvalidXml(String),

    /// Well-formed but not a layout this importer reads (e.g. score-timewise)
    #[error("Unsupported notation format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),
}

/// Export failures
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("the score has no measures to export")]
    EmptyScore,

    #[error("{pitch} in {part}, measure {measure} cannot be written: {reason}")]
    UnrepresentablePitch {
        part: String,
        measure: u32,
        pitch: String,
        reason: String,
    },

    /// Onsets and durations whose common tick size does not fit an integer
    #[error("timing in {part}, measure {measure} cannot be written as whole ticks")]
    UnrepresentableTiming { part: String, measure: u32 },

    #[error("could not write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ImportResult<T> = Result<T, ImportError>;
pub type ExportResult<T> = Result<T, ExportError>;
