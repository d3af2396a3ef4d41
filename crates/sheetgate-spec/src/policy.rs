use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Which policy column of the control table a policy came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyColumn {
    Read,
    Write,
}

impl PolicyColumn {
    /// Header text of the column in the control table.
    pub const fn header(&self) -> &'static str {
        match self {
            PolicyColumn::Read => "Read",
            PolicyColumn::Write => "Write",
        }
    }
}

impl fmt::Display for PolicyColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Read or write permission for one resource, with an optional field allow-list.
///
/// The control table stores policies as JSON text such as
/// `{"enable": true, "fields": ["id", "name"]}`. Parsing is lenient about shape
/// and strict about syntax:
///
/// - `enable` counts only when it is literally `true`;
/// - `fields` counts only when it is an array, and only its string elements;
/// - a document that is not an object is a disabled policy;
/// - text that is not JSON at all is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "JsonValue")]
pub struct AccessPolicy {
    pub enable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl AccessPolicy {
    /// Policy that permits nothing and declares no allow-list.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Policy that permits the operation for every field.
    pub fn enabled() -> Self {
        Self {
            enable: true,
            fields: None,
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Parse the text of a `Read`/`Write` cell. An empty cell is a disabled policy.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        if text.is_empty() {
            return Ok(Self::disabled());
        }
        let value: JsonValue = serde_json::from_str(text)?;
        Ok(Self::from(value))
    }

    /// Field allow-list, when one is configured.
    pub fn allow_list(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }
}

impl From<JsonValue> for AccessPolicy {
    fn from(value: JsonValue) -> Self {
        let JsonValue::Object(map) = value else {
            return Self::disabled();
        };
        let enable = matches!(map.get("enable"), Some(JsonValue::Bool(true)));
        let fields = match map.get("fields") {
            Some(JsonValue::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_owned))
                    .collect(),
            ),
            _ => None,
        };
        Self { enable, fields }
    }
}
