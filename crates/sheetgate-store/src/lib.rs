//! Tabular storage for sheetgate.
//!
//! A table is one sheet of one spreadsheet whose first row names the columns.
//! [`TabularStore`] reads such a table as [`Row`]s and appends rows to it,
//! addressing the destination in A1 form. The remote side is reached through
//! the [`SheetBackend`] trait; this crate ships an in-memory backend, a JSON
//! file backend and, with the `webservice` feature, a Google Sheets client.

pub mod backends;
pub mod error;
pub mod store;
pub mod traits;

pub use backends::{JsonFileBackend, MemoryBackend};
#[cfg(feature = "webservice")]
pub use backends::{AccessToken, SheetsApiBackend};
pub use error::StoreError;
pub use store::{AppendOutcome, TabularStore, append_range};
pub use traits::{SheetBackend, TableRef, ValueGrid, WriteAck};

// Re-export for convenience
pub use sheetgate_common::{CellValue, RangeAddress, Row};
