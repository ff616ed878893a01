//! MusicXML behind the [`NotationAdapter`] seam
//!
//! The importer and exporter only ever see a [`NotationDocument`]; reading
//! and writing the file format is the adapter's job.

pub mod harmony;
pub mod reader;
pub mod tree;
pub mod writer;

pub use tree::{
    ElementKind, KeySignature, NotationDocument, NotationElement, NotationMeasure, NotationNote, NotationPart,
};

use crate::converters::errors::{ExportError, ImportError};

/// Reads and writes one external notation format
pub trait NotationAdapter {
    fn read(&self, source: &str) -> Result<NotationDocument, ImportError>;
    fn write(&self, document: &NotationDocument) -> Result<String, ExportError>;
}

/// Uncompressed score-partwise MusicXML
#[derive(Debug, Clone, Copy, Default)]
pub struct MusicXmlAdapter;

impl NotationAdapter for MusicXmlAdapter {
    fn read(&self, source: &str) -> Result<NotationDocument, ImportError> {
        reader::read_document(source)
    }

    fn write(&self, document: &NotationDocument) -> Result<String, ExportError> {
        Ok(writer::write_document(document))
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
