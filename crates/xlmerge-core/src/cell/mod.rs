//! Cell types: values, addresses, and sparse storage

mod address;
mod storage;
mod value;

pub use address::{column_to_letters, letters_to_column, CellAddress, CellRange};
pub use storage::{CellData, CellStorage};
pub use value::{CellError, CellValue, SharedString, StringPool};
