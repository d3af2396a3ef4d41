use std::borrow::Cow;
use std::cmp::Ordering;

/// A single cell value as exchanged with a backend.
///
/// Fetched cells arrive as JSON strings holding the formatted text shown in the
/// sheet. Write payloads may carry any JSON scalar and are handed to the backend
/// untouched, which interprets them as if a user had typed them.
pub type CellValue = serde_json::Value;

/// Text form of a cell, used for equality filters and ordering.
///
/// Strings are returned as-is and `null` is the empty string. Integral floats
/// drop their fraction (`1.0` is `1`), matching how a sheet displays them.
/// Every other value uses its JSON rendering (`3`, `true`, `[1,2]`).
pub fn cell_text(value: &CellValue) -> Cow<'_, str> {
    match value {
        CellValue::String(s) => Cow::Borrowed(s.as_str()),
        CellValue::Null => Cow::Borrowed(""),
        CellValue::Number(n) => Cow::Owned(number_text(n)),
        other => Cow::Owned(other.to_string()),
    }
}

fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        // Past 1e21 the shortest form switches to an exponent.
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{f:.0}")
            }
        }
        _ => n.to_string(),
    }
}

/// Total order over optional cells: a missing cell sorts before any present
/// one, present cells compare by their text.
pub fn compare_cells(lhs: Option<&CellValue>, rhs: Option<&CellValue>) -> Ordering {
    match (lhs, rhs) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => cell_text(a).cmp(&cell_text(b)),
    }
}
