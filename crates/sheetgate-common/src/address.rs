//! A1-style addressing for table ranges.
//!
//! Coordinates are zero-based on the way in and rendered one-based on the way
//! out. Columns use bijective base-26 (`A..Z`, `AA..AZ`, `BA..`), so there is
//! no zero digit and `Z` is followed directly by `AA`.

use core::fmt;

/// Errors returned when constructing a range from unchecked corners.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RangeError {
    /// The start row lies below the end row.
    RowOrder { start: u32, end: u32 },
    /// The start column lies right of the end column.
    ColOrder { start: u32, end: u32 },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::RowOrder { start, end } => {
                write!(f, "range start row {start} is after end row {end}")
            }
            RangeError::ColOrder { start, end } => {
                write!(f, "range start col {start} is after end col {end}")
            }
        }
    }
}

impl std::error::Error for RangeError {}

/// Convert a zero-based column index into its letter form (`0 -> A`, `26 -> AA`).
pub fn column_to_letters(mut col: u32) -> String {
    let mut buf = Vec::new();
    loop {
        let rem = (col % 26) as u8;
        buf.push(b'A' + rem);
        col /= 26;
        if col == 0 {
            break;
        }
        col -= 1;
    }
    buf.reverse();
    buf.into_iter().map(char::from).collect()
}

/// Convert zero-based `(row, col)` into a cell reference such as `C7`.
pub fn to_address(row: u32, col: u32) -> String {
    format!("{}{}", column_to_letters(col), u64::from(row) + 1)
}

/// Inclusive rectangular range inside one sheet, zero-based on both axes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RangeAddress {
    pub sheet: String,
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl RangeAddress {
    pub fn new(
        sheet: impl Into<String>,
        start: (u32, u32),
        end: (u32, u32),
    ) -> Result<Self, RangeError> {
        if start.0 > end.0 {
            return Err(RangeError::RowOrder {
                start: start.0,
                end: end.0,
            });
        }
        if start.1 > end.1 {
            return Err(RangeError::ColOrder {
                start: start.1,
                end: end.1,
            });
        }
        Ok(Self {
            sheet: sheet.into(),
            start_row: start.0,
            start_col: start.1,
            end_row: end.0,
            end_col: end.1,
        })
    }

    pub fn width(&self) -> u32 {
        self.end_col - self.start_col + 1
    }

    pub fn height(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    /// Top-left corner in A1 form.
    pub fn top_left(&self) -> String {
        to_address(self.start_row, self.start_col)
    }

    /// Bottom-right corner in A1 form.
    pub fn bottom_right(&self) -> String {
        to_address(self.end_row, self.end_col)
    }
}

impl fmt::Display for RangeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}!{}:{}",
            self.sheet,
            self.top_left(),
            self.bottom_right()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_letter_columns() {
        assert_eq!(to_address(0, 0), "A1");
        assert_eq!(to_address(0, 25), "Z1");
        assert_eq!(to_address(5, 0), "A6");
    }

    #[test]
    fn bijective_rollover() {
        assert_eq!(to_address(0, 26), "AA1");
        assert_eq!(to_address(0, 27), "AB1");
        assert_eq!(to_address(0, 51), "AZ1");
        assert_eq!(to_address(0, 52), "BA1");
        assert_eq!(to_address(0, 701), "ZZ1");
        assert_eq!(to_address(0, 702), "AAA1");
    }

    #[test]
    fn row_is_one_based_without_overflow() {
        assert_eq!(to_address(u32::MAX, 0), format!("A{}", u64::from(u32::MAX) + 1));
    }

    #[test]
    fn range_display() {
        let range = RangeAddress::new("Orders", (4, 0), (6, 3)).unwrap();
        assert_eq!(range.to_string(), "Orders!A5:D7");
        assert_eq!(range.width(), 4);
        assert_eq!(range.height(), 3);
    }

    #[test]
    fn range_rejects_inverted_corners() {
        assert_eq!(
            RangeAddress::new("S", (3, 0), (2, 0)).unwrap_err(),
            RangeError::RowOrder { start: 3, end: 2 }
        );
        assert_eq!(
            RangeAddress::new("S", (0, 5), (0, 1)).unwrap_err(),
            RangeError::ColOrder { start: 5, end: 1 }
        );
    }
}
