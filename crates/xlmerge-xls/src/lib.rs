//! # xlmerge-xls
//!
//! XLS (BIFF8) reader for xlmerge.
//!
//! Handles the legacy Excel binary format (.xls): a CFB/OLE2 container
//! holding a `Workbook` stream of BIFF8 records. Reading only; merged
//! output is always written as XLSX.

pub mod biff;
pub mod error;
pub mod reader;

mod styles;

pub use error::{XlsError, XlsResult};
pub use reader::XlsReader;
