//! Core data structures for the xlmerge workspace.
//!
//! This crate defines the in-memory workbook model shared by the format
//! readers/writers and the merge engine:
//!
//! - [`Workbook`] - an ordered collection of worksheets with unique names
//! - [`Worksheet`] - sparse cell grid plus comments and dimension overrides
//! - [`CellValue`] - the typed value stored in a cell
//! - [`Style`] - cell formatting, deduplicated through a per-sheet [`StylePool`]
//!
//! The model is format-agnostic: nothing here knows about XLSX or BIFF.

mod comment;
mod error;
mod workbook;
mod worksheet;

pub mod cell;
pub mod style;

pub use cell::{
    column_to_letters, letters_to_column, CellAddress, CellData, CellError, CellRange, CellValue,
    SharedString, StringPool,
};
pub use comment::CellComment;
pub use error::{CoreError, Result};
pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, DiagonalDirection, FillStyle,
    FontStyle, HorizontalAlignment, NumberFormat, PatternType, Protection, Style, StylePool,
    Underline, VerticalAlignment,
};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (1,048,576, same as Excel).
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (16,384 = column XFD).
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name in characters.
pub const MAX_SHEET_NAME_LEN: usize = 31;
