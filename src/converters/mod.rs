//! Format converters
//!
//! Import from and export to external notation files. MusicXML is read and
//! written through the [`NotationAdapter`] seam; the importer and exporter
//! map between its document tree and [`Score`](crate::models::Score).

pub mod errors;
pub mod export;
pub mod import;
pub mod musicxml;

pub use errors::{ExportError, ExportResult, ImportError, ImportResult};
pub use export::{export_document, export_musicxml_file, export_musicxml_string};
pub use import::{import_document, import_musicxml_file, import_musicxml_str, ImportReport, SkippedElement};
pub use musicxml::{MusicXmlAdapter, NotationAdapter, NotationDocument};
