//! # xlmerge
//!
//! Merges multiple spreadsheet files (`.xls` and `.xlsx`) into a single
//! timestamped `.xlsx`. Sheets are aligned by name: the first input to
//! introduce a sheet name owns its header row, and every input's body rows
//! are appended in order, carrying values, styles, and comments.
//!
//! ```no_run
//! use xlmerge::{merge_files, SourceDescriptor};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), xlmerge::MergeError> {
//! let sources = [
//!     SourceDescriptor::from_path("january.xlsx").unwrap(),
//!     SourceDescriptor::from_path("february.xls").unwrap(),
//! ];
//! let out = merge_files(&sources, true, Path::new("."))?;
//! println!("wrote {}", out.display());
//! # Ok(())
//! # }
//! ```

pub mod autosize;
pub mod config;
pub mod error;
pub mod merge;
pub mod output;
pub mod source;

pub use autosize::auto_size_columns;
pub use config::MergeConfig;
pub use error::{FormatError, MergeError};
pub use merge::{merge_files, merge_workbook};
pub use source::{SourceDescriptor, SourceFormat};

pub use xlmerge_core::{CellValue, Workbook, Worksheet};
pub use xlmerge_xls::XlsReader;
pub use xlmerge_xlsx::{XlsxReader, XlsxWriter};
