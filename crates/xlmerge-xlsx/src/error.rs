//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur during XLSX reading/writing
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Invalid file format
    #[error("invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Missing required package part
    #[error("missing required part: {0}")]
    MissingPart(String),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// Core model error
    #[error("core error: {0}")]
    Core(#[from] xlmerge_core::CoreError),
}
