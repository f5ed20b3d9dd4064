//! Error types for the xlsx-ingest library.

use std::io;
use thiserror::Error;

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an import.
///
/// Every variant is fatal for the whole workbook; the importer never hands
/// back a partially assembled document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The container is not a readable ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// An XML part could not be parsed.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required package entry is missing or names a directory.
    #[error("{0} not found")]
    PartNotFound(String),

    /// An expected relationship type is absent (officeDocument,
    /// sharedStrings, styles, or the root relationship set itself).
    #[error("no {0} relationship found")]
    MissingRelationship(String),

    /// A sheet declares a relationship id that its workbook does not define.
    #[error("no relationship {rel_id} found for sheet {sheet}")]
    SheetRelationshipMissing {
        /// Sheet name as declared in the workbook part
        sheet: String,
        /// The dangling relationship id
        rel_id: String,
    },

    /// A cell reference or range failed the `A1` / `A1:B2` grammar.
    #[error("invalid range: {0}")]
    InvalidRangeSyntax(String),

    /// The workbook could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
