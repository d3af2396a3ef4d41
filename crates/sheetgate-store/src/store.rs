use sheetgate_common::{CellValue, RangeAddress, Row, decode, encode};

use crate::error::StoreError;
use crate::traits::{SheetBackend, TableRef, ValueGrid, WriteAck};

/// Result of [`TabularStore::append`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppendOutcome {
    /// Positional rows handed to the backend, one per kept input row.
    pub values: Vec<Vec<CellValue>>,
    pub ack: WriteAck,
    /// Destination range, or `None` when nothing was written.
    pub range: Option<RangeAddress>,
    /// Input rows dropped because none of their fields matched a header.
    pub dropped: usize,
}

/// Destination of an append of `inserted` rows below `row_count` occupied rows.
///
/// Rows start right after the last occupied row and columns at `A`. The
/// far corner sits at `(row_count + inserted, header_len)`, one row and one
/// column past the data, matching the range historically requested from the
/// backend; the extra row and column are never written.
pub fn append_range(
    sheet: &str,
    row_count: usize,
    inserted: usize,
    header_len: usize,
) -> Result<RangeAddress, StoreError> {
    let overflow = || StoreError::RangeOverflow {
        range: sheet.to_string(),
        rows: row_count + inserted,
        cols: header_len,
    };
    let start = u32::try_from(row_count).map_err(|_| overflow())?;
    let end_row = row_count
        .checked_add(inserted)
        .and_then(|end| u32::try_from(end).ok())
        .ok_or_else(overflow)?;
    let end_col = u32::try_from(header_len).map_err(|_| overflow())?;
    Ok(RangeAddress::new(sheet, (start, 0), (end_row, end_col))?)
}

/// Header-aware view over a [`SheetBackend`].
///
/// Every call goes to the backend; nothing is cached between calls.
pub struct TabularStore<'a, B: SheetBackend> {
    backend: &'a B,
}

impl<'a, B: SheetBackend> TabularStore<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &'a B {
        self.backend
    }

    pub fn fetch_grid(&self, table: &TableRef) -> Result<ValueGrid, StoreError> {
        self.backend
            .fetch_range(table)
            .map_err(|e| StoreError::from_backend(table, e))
    }

    /// All data rows of `table`, decoded against its header row.
    ///
    /// A table with no header row yields no rows.
    pub fn fetch_all(&self, table: &TableRef) -> Result<Vec<Row>, StoreError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("fetch_all", table = %table).entered();

        let grid = self.fetch_grid(table)?;
        let headers = grid.headers();
        let rows: Vec<Row> = grid
            .data_rows()
            .iter()
            .map(|data| decode(&headers, data))
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(rows = rows.len(), columns = headers.len(), "fetched table");
        Ok(rows)
    }

    /// Append `rows` below the occupied area of `table`.
    ///
    /// Each row is laid out against the current header; rows matching no
    /// header are dropped. When nothing remains the backend is not called and a
    /// zero acknowledgement is returned.
    pub fn append(&self, table: &TableRef, rows: &[Row]) -> Result<AppendOutcome, StoreError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("append", table = %table, requested = rows.len()).entered();

        let grid = self.fetch_grid(table)?;
        let headers = grid.headers();

        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            let encoded = encode(&headers, row);
            if !encoded.is_empty() {
                values.push(encoded.into_values());
            }
        }
        let dropped = rows.len() - values.len();
        #[cfg(feature = "tracing")]
        if dropped > 0 {
            tracing::warn!(dropped, "rows matching no header were dropped");
        }

        if values.is_empty() {
            return Ok(AppendOutcome {
                dropped,
                ..AppendOutcome::default()
            });
        }

        let range = append_range(
            &table.sheet_name,
            grid.row_count(),
            values.len(),
            headers.len(),
        )?;

        #[cfg(feature = "tracing")]
        tracing::debug!(range = %range, rows = values.len(), dropped, "writing rows");

        let ack = self
            .backend
            .write_range(table, &range, values.clone())
            .map_err(|e| StoreError::from_backend(table, e))?;

        Ok(AppendOutcome {
            values,
            ack,
            range: Some(range),
            dropped,
        })
    }
}
