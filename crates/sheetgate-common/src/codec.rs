//! Mapping between positional sheet rows and field→value [`Row`]s.
//!
//! The header row of a table names each column position. Decoding zips a data
//! row against the header; encoding lays a [`Row`] back out in header order.

use crate::row::Row;
use crate::value::CellValue;

/// Pair `headers[i]` with `data[i]` for every position both sides cover.
///
/// A data row shorter than the header leaves the trailing fields absent.
/// Extra data cells past the last header are dropped.
pub fn decode(headers: &[String], data: &[CellValue]) -> Row {
    headers
        .iter()
        .zip(data.iter())
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}

/// Lay `row` out in header order. Fields the header does not name are ignored.
pub fn encode(headers: &[String], row: &Row) -> EncodedRow {
    EncodedRow {
        slots: headers
            .iter()
            .map(|field| row.get(field).cloned())
            .collect(),
    }
}

/// Header-ordered slots produced by [`encode`]; `None` marks an unset cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodedRow {
    slots: Vec<Option<CellValue>>,
}

impl EncodedRow {
    pub fn slots(&self) -> &[Option<CellValue>] {
        &self.slots
    }

    /// Number of slots holding a value.
    pub fn populated(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True when no field of the source row matched any header.
    pub fn is_empty(&self) -> bool {
        self.populated() == 0
    }

    /// Positional values ready for a backend write.
    ///
    /// Trailing unset slots are cut so the row ends at its last populated cell;
    /// interior unset slots become `null`, which backends treat as "leave as is".
    pub fn into_values(self) -> Vec<CellValue> {
        let len = self
            .slots
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |idx| idx + 1);
        self.slots
            .into_iter()
            .take(len)
            .map(|slot| slot.unwrap_or(CellValue::Null))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn short_data_leaves_fields_absent() {
        let h = headers(&["id", "name", "email"]);
        let row = decode(&h, &[json!("1"), json!("Ann")]);
        assert_eq!(row.len(), 2);
        assert!(!row.contains_field("email"));
    }

    #[test]
    fn long_data_is_truncated_to_header() {
        let h = headers(&["id"]);
        let row = decode(&h, &[json!("1"), json!("extra")]);
        assert_eq!(row.field_names().collect::<Vec<_>>(), vec!["id"]);
    }

    #[test]
    fn encode_follows_header_order() {
        let h = headers(&["a", "b", "c"]);
        let row: Row = [("c", json!(3)), ("a", json!(1)), ("zz", json!(9))]
            .into_iter()
            .collect();
        let encoded = encode(&h, &row);
        assert_eq!(encoded.slots(), &[Some(json!(1)), None, Some(json!(3))]);
        assert_eq!(encoded.populated(), 2);
        assert_eq!(encoded.into_values(), vec![json!(1), CellValue::Null, json!(3)]);
    }

    #[test]
    fn unmatched_fields_encode_empty() {
        let h = headers(&["x", "y"]);
        let encoded = encode(&h, &Row::new());
        assert!(encoded.is_empty());
        assert!(encoded.into_values().is_empty());

        let stranger: Row = [("q", json!("v"))].into_iter().collect();
        assert!(encode(&h, &stranger).is_empty());
    }

    #[test]
    fn trailing_unset_slots_are_cut() {
        let h = headers(&["x", "y", "z"]);
        let row: Row = [("x", json!("only"))].into_iter().collect();
        assert_eq!(encode(&h, &row).into_values(), vec![json!("only")]);
    }

    #[test]
    fn covered_rows_round_trip() {
        let h = headers(&["id", "name", "qty"]);
        let row: Row = [("id", json!("7")), ("name", json!("bolt")), ("qty", json!("40"))]
            .into_iter()
            .collect();
        let values = encode(&h, &row).into_values();
        assert_eq!(decode(&h, &values), row);
    }
}
