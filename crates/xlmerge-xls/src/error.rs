//! XLS error types

use thiserror::Error;

/// Result type for XLS operations
pub type XlsResult<T> = std::result::Result<T, XlsError>;

/// Errors that can occur while reading an XLS file
#[derive(Debug, Error)]
pub enum XlsError {
    /// IO error (the cfb crate reports its errors through std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid file format
    #[error("invalid XLS format: {0}")]
    InvalidFormat(String),

    /// Unsupported BIFF version
    #[error("unsupported XLS version: {0}")]
    UnsupportedVersion(String),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// Core model error
    #[error("core error: {0}")]
    Core(#[from] xlmerge_core::CoreError),
}
