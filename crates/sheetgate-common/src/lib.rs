pub mod address;
pub mod codec;
pub mod row;
pub mod value;

pub use address::{RangeAddress, RangeError, column_to_letters, to_address};
pub use codec::{EncodedRow, decode, encode};
pub use row::Row;
pub use value::{CellValue, cell_text, compare_cells};
