//! # xlmerge-xlsx
//!
//! XLSX (Office Open XML) reader and writer for xlmerge.
//!
//! Reading covers the parts the merge pipeline carries: sheet data (values,
//! formulas with cached results, shared and inline strings), cell styles,
//! comments, and row/column dimension overrides. Writing produces a minimal
//! but valid package with inline strings and a workbook-wide style table.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
