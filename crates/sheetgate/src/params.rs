//! Read parameters parsed from a request's query string.
//!
//! Each parameter is parsed once into a validated structure. Parsing never
//! looks at the data; checks that depend on the rows (filter recognition,
//! sort field validity) happen when a filter or sort is applied.

use sheetgate_common::{CellValue, Row, cell_text, compare_cells};

use crate::config::GatewayConfig;
use crate::error::GatewayError;

pub const PARAM_FILTER: &str = "q";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_LIMIT: &str = "limit";
pub const PARAM_OFFSET: &str = "offset";

/// Field/value equality terms from the `q` parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    terms: Vec<(String, CellValue)>,
}

impl FilterSpec {
    /// Parse `q`, which must be a JSON object.
    pub fn parse(text: &str) -> Result<Self, GatewayError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| GatewayError::bad_request(format!("`q` is not valid JSON: {e}")))?;
        match value {
            serde_json::Value::Object(map) => Ok(Self {
                terms: map.into_iter().collect(),
            }),
            _ => Err(GatewayError::bad_request("`q` must be a JSON object")),
        }
    }

    pub fn with_term(mut self, field: impl Into<String>, value: CellValue) -> Self {
        self.terms.push((field.into(), value));
        self
    }

    pub fn terms(&self) -> &[(String, CellValue)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Keep the rows matching every recognized term.
    ///
    /// A term is recognized when its field is present in the first row; other
    /// terms are ignored. An empty input is returned as is.
    pub fn apply(&self, rows: Vec<Row>) -> Vec<Row> {
        let Some(first) = rows.first() else {
            return rows;
        };
        let recognized: Vec<&(String, CellValue)> = self
            .terms
            .iter()
            .filter(|(field, _)| first.contains_field(field))
            .collect();
        if recognized.is_empty() {
            return rows;
        }
        rows.into_iter()
            .filter(|row| {
                recognized.iter().all(|(field, wanted)| {
                    row.get(field)
                        .is_some_and(|cell| cell_matches(cell, wanted))
                })
            })
            .collect()
    }
}

/// Text equality between a cell and a filter value; structured filter values never match.
fn cell_matches(cell: &CellValue, wanted: &CellValue) -> bool {
    match wanted {
        CellValue::Null | CellValue::Array(_) | CellValue::Object(_) => false,
        _ => cell_text(cell) == cell_text(wanted),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

/// Comma separated sort keys, the first one primary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Parse tokens such as `-age,name` or `+name`.
    ///
    /// A token is descending when it starts with `-`; the field is the token
    /// with surrounding `+`, `-` and spaces removed. An empty `text` has no
    /// keys, but a blank token inside it is kept as a key with an empty field,
    /// which no row has.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        let keys = text
            .split(',')
            .map(|token| SortKey {
                field: token
                    .trim_matches(|c| matches!(c, '-' | '+' | ' '))
                    .to_string(),
                descending: token.starts_with('-'),
            })
            .collect();
        Self { keys }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sort `rows` in place.
    ///
    /// Every key must name a field of the first row, otherwise nothing is
    /// sorted. Keys are applied as stable sorts from last to first. Rows
    /// lacking the field order before rows that have it.
    pub fn apply(&self, rows: &mut [Row]) -> Result<(), GatewayError> {
        let Some(first) = rows.first() else {
            return Ok(());
        };
        if let Some(unknown) = self.keys.iter().find(|key| !first.contains_field(&key.field)) {
            return Err(GatewayError::InvalidSortField {
                field: unknown.field.clone(),
            });
        }
        for key in self.keys.iter().rev() {
            rows.sort_by(|lhs, rhs| {
                let ord = compare_cells(lhs.get(&key.field), rhs.get(&key.field));
                if key.descending { ord.reverse() } else { ord }
            });
        }
        Ok(())
    }
}

/// Effective pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    /// Build a window from raw `limit`/`offset` text.
    ///
    /// Missing, non-numeric and zero limits take the configured default, kept
    /// between 1 and the cap. A negative limit is an empty page. Offsets
    /// default to zero and negative ones clamp to zero.
    pub fn from_raw(limit: Option<&str>, offset: Option<&str>, config: &GatewayConfig) -> Self {
        let cap = config.effective_max_limit();
        let limit = match limit.and_then(leading_int) {
            None | Some(0) => config.default_limit.clamp(1, cap),
            Some(n) if n < 0 => 0,
            Some(n) => usize::try_from(n).map_or(cap, |n| n.min(cap)),
        };
        let offset = offset
            .and_then(leading_int)
            .map_or(0, |n| usize::try_from(n).unwrap_or(if n < 0 { 0 } else { usize::MAX }));
        Self { limit, offset }
    }

    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.limit).collect()
    }
}

/// Decimal integer prefix of `text` (`"25abc"` is 25).
///
/// Leading whitespace and one sign are accepted; parsing stops at the first
/// non-digit. Values past `i64` saturate.
pub fn leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end]
        .bytes()
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add(i64::from(b - b'0')));
    Some(if negative { -magnitude } else { magnitude })
}

/// Everything a read request asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadParams {
    pub filter: FilterSpec,
    pub sort: SortSpec,
    pub page: Page,
}

impl ReadParams {
    /// No filter, no sort, default page.
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            filter: FilterSpec::default(),
            sort: SortSpec::default(),
            page: Page::from_raw(None, None, config),
        }
    }

    /// Parse decoded query pairs. Unknown keys are ignored; a repeated key
    /// keeps its last value. An empty `q` or `sort` counts as absent.
    pub fn from_query<K, V>(
        pairs: impl IntoIterator<Item = (K, V)>,
        config: &GatewayConfig,
    ) -> Result<Self, GatewayError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let (mut q, mut sort, mut limit, mut offset) = (None, None, None, None);
        for (key, value) in pairs {
            let value = value.as_ref().to_string();
            match key.as_ref() {
                PARAM_FILTER => q = Some(value),
                PARAM_SORT => sort = Some(value),
                PARAM_LIMIT => limit = Some(value),
                PARAM_OFFSET => offset = Some(value),
                _ => {}
            }
        }

        let filter = match q.as_deref().filter(|text| !text.is_empty()) {
            Some(text) => FilterSpec::parse(text)?,
            None => FilterSpec::default(),
        };
        let sort = sort.as_deref().map(SortSpec::parse).unwrap_or_default();
        let page = Page::from_raw(limit.as_deref(), offset.as_deref(), config);
        Ok(Self { filter, sort, page })
    }
}
