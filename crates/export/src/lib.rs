//! # npay Export
//!
//! Report writers for the price analysis service:
//! - [`spreadsheet`]: xlsx workbook with a summary block and the full report
//!   projection table
//! - [`document`]: single-page PDF report (optional, behind the
//!   `document-export` feature)
//!
//! Both writers consume the same report projection as the on-screen table, so
//! exported row order always matches what the user sees.

pub mod spreadsheet;

#[cfg(feature = "document-export")]
pub mod document;

#[cfg(not(feature = "document-export"))]
pub mod document {
    //! Stub used when the document library is not compiled in. The capability
    //! flag is off, so callers disable the feature up front; this stub only
    //! exists so call sites type-check either way.

    use crate::{DocumentReport, ExportError};

    pub fn render(_report: &DocumentReport<'_>) -> Result<Vec<u8>, ExportError> {
        Err(ExportError::DocumentUnavailable)
    }
}

use npay_core::{ItemStats, Record};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to build spreadsheet: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
    #[error("failed to build document: {0}")]
    Document(String),
    #[error("document export is not available in this build")]
    DocumentUnavailable,
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Whether the document (PDF) writer was compiled into this binary.
///
/// Resolved once; callers branch on this flag instead of attempting the
/// export and catching failure per call.
pub fn document_export_available() -> bool {
    cfg!(feature = "document-export")
}

/// Everything a document render needs: the analysed item, its statistics, the
/// report projection rows, and where to look for a Hangul-capable font.
#[derive(Debug)]
pub struct DocumentReport<'a> {
    pub item_name: &'a str,
    pub stats: &'a ItemStats,
    pub rows: &'a [&'a Record],
    /// Path tried for a locale-appropriate font. When unreadable the writer
    /// falls back to a built-in Latin-only font.
    pub font_path: &'a Path,
}
