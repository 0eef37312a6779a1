//! Error types for the core workbook model

use thiserror::Error;

/// Errors produced by the core workbook model
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cell address string could not be parsed
    #[error("invalid cell address: {0}")]
    InvalidAddress(String),

    /// A cell range string could not be parsed
    #[error("invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index exceeds the worksheet row limit
    #[error("row {row} out of bounds (max {max})")]
    RowOutOfBounds { row: u32, max: u32 },

    /// Column index exceeds the worksheet column limit
    #[error("column {col} out of bounds (max {max})")]
    ColumnOutOfBounds { col: u16, max: u16 },

    /// No worksheet with the given name exists
    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    /// Sheet name is empty, too long, or contains forbidden characters
    #[error("invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// A worksheet with the same name (case-insensitive) already exists
    #[error("duplicate sheet name: {0}")]
    DuplicateSheetName(String),

    /// A style index does not refer to an entry in the style pool
    #[error("invalid style index: {0}")]
    InvalidStyleIndex(u32),
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
