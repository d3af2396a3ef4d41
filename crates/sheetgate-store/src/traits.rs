use std::fmt;

use serde::{Deserialize, Serialize};
use sheetgate_common::{CellValue, RangeAddress, cell_text};

/// One sheet inside one spreadsheet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

impl TableRef {
    pub fn new(spreadsheet_id: impl Into<String>, sheet_name: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.spreadsheet_id, self.sheet_name)
    }
}

/// Raw contents of a table as returned by a backend, row-major.
///
/// Row 0 is the header. Rows may be ragged: backends drop trailing empty
/// cells, and a table that has never been written is an empty grid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueGrid {
    #[serde(default)]
    pub values: Vec<Vec<CellValue>>,
}

impl ValueGrid {
    pub fn new(values: Vec<Vec<CellValue>>) -> Self {
        Self { values }
    }

    /// Column names taken from row 0, or nothing for an empty grid.
    pub fn headers(&self) -> Vec<String> {
        self.values
            .first()
            .map(|row| row.iter().map(|cell| cell_text(cell).into_owned()).collect())
            .unwrap_or_default()
    }

    /// Every row after the header.
    pub fn data_rows(&self) -> &[Vec<CellValue>] {
        self.values.get(1..).unwrap_or_default()
    }

    /// Number of rows currently occupied, header included.
    pub fn row_count(&self) -> usize {
        self.values.len()
    }
}

/// Acknowledgement of a range write.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteAck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: usize,
    #[serde(default)]
    pub updated_columns: usize,
    #[serde(default)]
    pub updated_cells: usize,
}

/// Remote side of a table: whatever actually holds the cells.
///
/// Implementations carry their own authenticated session; nothing here knows
/// how it was obtained. Calls are never retried by the caller.
pub trait SheetBackend: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the whole used range of `table`, header row first.
    fn fetch_range(&self, table: &TableRef) -> Result<ValueGrid, Self::Error>;

    /// Write `values` into `range`, anchored at its top-left corner.
    ///
    /// A `null` cell leaves the existing cell untouched.
    fn write_range(
        &self,
        table: &TableRef,
        range: &RangeAddress,
        values: Vec<Vec<CellValue>>,
    ) -> Result<WriteAck, Self::Error>;
}
