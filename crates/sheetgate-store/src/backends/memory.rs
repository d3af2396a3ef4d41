use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use sheetgate_common::{CellValue, RangeAddress};

use crate::error::StoreError;
use crate::traits::{SheetBackend, TableRef, ValueGrid, WriteAck};

/// Sheets of one spreadsheet, keyed by sheet name.
pub type SheetMap = BTreeMap<String, Vec<Vec<CellValue>>>;

/// Spreadsheets keyed by id.
pub type SpreadsheetMap = BTreeMap<String, SheetMap>;

/// Backend holding every table in process memory.
///
/// Tables must be created with [`MemoryBackend::insert_table`] before they can
/// be read or written; an unknown spreadsheet or sheet is
/// [`StoreError::TableNotFound`], the way a remote service rejects a range on a
/// sheet that does not exist.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    spreadsheets: RwLock<SpreadsheetMap>,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_spreadsheets(spreadsheets: SpreadsheetMap) -> Self {
        Self {
            spreadsheets: RwLock::new(spreadsheets),
            writes: AtomicUsize::new(0),
        }
    }

    /// Builder form of [`insert_table`](Self::insert_table).
    pub fn with_table(self, table: &TableRef, values: Vec<Vec<CellValue>>) -> Self {
        self.insert_table(table, values);
        self
    }

    /// Create or replace a table.
    pub fn insert_table(&self, table: &TableRef, values: Vec<Vec<CellValue>>) {
        self.spreadsheets
            .write()
            .entry(table.spreadsheet_id.clone())
            .or_default()
            .insert(table.sheet_name.clone(), values);
    }

    /// Copy of a table's cells, if it exists.
    pub fn table(&self, table: &TableRef) -> Option<Vec<Vec<CellValue>>> {
        self.spreadsheets
            .read()
            .get(&table.spreadsheet_id)
            .and_then(|sheets| sheets.get(&table.sheet_name))
            .cloned()
    }

    /// Number of successful `write_range` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> SpreadsheetMap {
        self.spreadsheets.read().clone()
    }
}

impl SheetBackend for MemoryBackend {
    type Error = StoreError;

    fn fetch_range(&self, table: &TableRef) -> Result<ValueGrid, StoreError> {
        self.table(table)
            .map(ValueGrid::new)
            .ok_or_else(|| StoreError::table_not_found(table))
    }

    fn write_range(
        &self,
        table: &TableRef,
        range: &RangeAddress,
        values: Vec<Vec<CellValue>>,
    ) -> Result<WriteAck, StoreError> {
        let rows = values.len();
        let cols = values.iter().map(Vec::len).max().unwrap_or(0);
        if rows > range.height() as usize || cols > range.width() as usize {
            return Err(StoreError::RangeOverflow {
                range: range.to_string(),
                rows,
                cols,
            });
        }

        let mut guard = self.spreadsheets.write();
        let grid = guard
            .get_mut(&table.spreadsheet_id)
            .and_then(|sheets| sheets.get_mut(&table.sheet_name))
            .ok_or_else(|| StoreError::table_not_found(table))?;

        let start_row = range.start_row as usize;
        let start_col = range.start_col as usize;
        let mut updated_rows = 0;
        let mut updated_cells = 0;
        let mut last_col: Option<usize> = None;
        let mut last_row = start_row;

        for (i, row) in values.into_iter().enumerate() {
            let mut touched = false;
            for (j, value) in row.into_iter().enumerate() {
                if value.is_null() {
                    continue;
                }
                let (r, c) = (start_row + i, start_col + j);
                if grid.len() <= r {
                    grid.resize_with(r + 1, Vec::new);
                }
                let target = &mut grid[r];
                if target.len() <= c {
                    target.resize(c + 1, CellValue::String(String::new()));
                }
                target[c] = value;
                touched = true;
                updated_cells += 1;
                last_col = Some(last_col.map_or(c, |prev| prev.max(c)));
            }
            if touched {
                updated_rows += 1;
                last_row = start_row + i;
            }
        }
        drop(guard);
        self.writes.fetch_add(1, Ordering::Relaxed);

        let updated_columns = last_col.map_or(0, |c| c + 1 - start_col);
        let updated_range = last_col.map(|c| {
            RangeAddress {
                sheet: range.sheet.clone(),
                start_row: range.start_row,
                start_col: range.start_col,
                end_row: last_row as u32,
                end_col: c as u32,
            }
            .to_string()
        });

        Ok(WriteAck {
            spreadsheet_id: Some(table.spreadsheet_id.clone()),
            updated_range,
            updated_rows,
            updated_columns,
            updated_cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn orders() -> TableRef {
        TableRef::new("book", "Orders")
    }

    #[test]
    fn unknown_table_is_not_found() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.fetch_range(&orders()),
            Err(StoreError::TableNotFound { .. })
        ));
    }

    #[test]
    fn write_skips_nulls_and_pads_gaps() {
        let backend =
            MemoryBackend::new().with_table(&orders(), vec![vec![json!("id"), json!("name")]]);
        let range = RangeAddress::new("Orders", (2, 0), (3, 2)).unwrap();
        let ack = backend
            .write_range(&orders(), &range, vec![vec![CellValue::Null, json!("x")]])
            .unwrap();

        assert_eq!(
            backend.table(&orders()).unwrap(),
            vec![
                vec![json!("id"), json!("name")],
                vec![],
                vec![json!(""), json!("x")],
            ]
        );
        assert_eq!(ack.updated_cells, 1);
        assert_eq!(ack.updated_rows, 1);
        assert_eq!(ack.updated_columns, 2);
        assert_eq!(ack.updated_range.as_deref(), Some("Orders!A3:B3"));
        assert_eq!(backend.write_count(), 1);
    }

    #[test]
    fn values_must_fit_range() {
        let backend = MemoryBackend::new().with_table(&orders(), vec![]);
        let range = RangeAddress::new("Orders", (0, 0), (0, 0)).unwrap();
        let err = backend
            .write_range(&orders(), &range, vec![vec![json!(1), json!(2)]])
            .unwrap_err();
        assert!(matches!(err, StoreError::RangeOverflow { rows: 1, cols: 2, .. }));
        assert_eq!(backend.write_count(), 0);
    }
}
