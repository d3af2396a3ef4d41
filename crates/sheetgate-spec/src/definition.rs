use std::fmt;

use serde::{Serialize, Serializer};
use sheetgate_common::{Row, cell_text};
use thiserror::Error;

use crate::policy::{AccessPolicy, PolicyColumn};

/// Status value that marks a definition as live. Compared exactly.
pub const ENABLED_STATUS: &str = "Enable";

/// Header names of the control table.
pub mod columns {
    pub const API_NAME: &str = "apiName";
    pub const STATUS: &str = "status";
    pub const SPREADSHEET_ID: &str = "spreadsheetId";
    pub const SHEET_NAME: &str = "sheetName";
    pub const READ: &str = "Read";
    pub const WRITE: &str = "Write";

    /// All columns in their conventional order.
    pub const ALL: [&str; 6] = [API_NAME, STATUS, SPREADSHEET_ID, SHEET_NAME, READ, WRITE];
}

/// Errors raised while turning control-table rows into definitions.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("definition `{api_name}` has an unparseable {column} policy: {source}")]
    InvalidPolicy {
        api_name: String,
        column: PolicyColumn,
        #[source]
        source: serde_json::Error,
    },
}

/// Reason a loaded definition may not serve requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionIssue {
    /// `status` is anything other than [`ENABLED_STATUS`].
    Disabled { status: String },
    MissingSpreadsheetId,
    MissingSheetName,
}

impl fmt::Display for DefinitionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionIssue::Disabled { status } => {
                write!(f, "status is `{status}`, expected `{ENABLED_STATUS}`")
            }
            DefinitionIssue::MissingSpreadsheetId => f.write_str("spreadsheetId is empty"),
            DefinitionIssue::MissingSheetName => f.write_str("sheetName is empty"),
        }
    }
}

/// Lifecycle status of a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionStatus {
    Enabled,
    Other(String),
}

impl DefinitionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DefinitionStatus::Enabled => ENABLED_STATUS,
            DefinitionStatus::Other(status) => status.as_str(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, DefinitionStatus::Enabled)
    }
}

impl From<&str> for DefinitionStatus {
    fn from(value: &str) -> Self {
        if value == ENABLED_STATUS {
            DefinitionStatus::Enabled
        } else {
            DefinitionStatus::Other(value.to_string())
        }
    }
}

impl Serialize for DefinitionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Normalized lookup key for resource names: trimmed and lowercased.
pub fn normalize_api_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One declared resource: a name bound to a backing table and its policies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDefinition {
    pub api_name: String,
    pub status: DefinitionStatus,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    #[serde(rename = "Read")]
    pub read: AccessPolicy,
    #[serde(rename = "Write")]
    pub write: AccessPolicy,
}

impl ApiDefinition {
    /// Enabled definition with both policies disabled.
    pub fn new(
        api_name: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Self {
        Self {
            api_name: api_name.into(),
            status: DefinitionStatus::Enabled,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            read: AccessPolicy::disabled(),
            write: AccessPolicy::disabled(),
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = DefinitionStatus::from(status);
        self
    }

    pub fn with_read(mut self, policy: AccessPolicy) -> Self {
        self.read = policy;
        self
    }

    pub fn with_write(mut self, policy: AccessPolicy) -> Self {
        self.write = policy;
        self
    }

    /// Build a definition from one decoded control-table row.
    ///
    /// Missing columns read as empty text. Only the policy columns can fail.
    pub fn from_row(row: &Row) -> Result<Self, DefinitionError> {
        let text = |column: &str| {
            row.get(column)
                .map(|value| cell_text(value).into_owned())
                .unwrap_or_default()
        };
        let api_name = text(columns::API_NAME);
        let policy = |column: PolicyColumn| {
            AccessPolicy::parse(&text(column.header())).map_err(|source| {
                DefinitionError::InvalidPolicy {
                    api_name: api_name.clone(),
                    column,
                    source,
                }
            })
        };
        let read = policy(PolicyColumn::Read)?;
        let write = policy(PolicyColumn::Write)?;

        Ok(Self {
            status: DefinitionStatus::from(text(columns::STATUS).as_str()),
            spreadsheet_id: text(columns::SPREADSHEET_ID),
            sheet_name: text(columns::SHEET_NAME),
            read,
            write,
            api_name,
        })
    }

    pub fn normalized_name(&self) -> String {
        normalize_api_name(&self.api_name)
    }

    /// Whether a requested name refers to this definition. Blank names never match.
    pub fn matches(&self, requested: &str) -> bool {
        !self.api_name.is_empty() && self.normalized_name() == normalize_api_name(requested)
    }

    pub fn policy(&self, column: PolicyColumn) -> &AccessPolicy {
        match column {
            PolicyColumn::Read => &self.read,
            PolicyColumn::Write => &self.write,
        }
    }

    /// Check that the definition may serve requests.
    ///
    /// Status is checked before the table coordinates, so a disabled row with
    /// missing ids reports [`DefinitionIssue::Disabled`].
    pub fn validate(&self) -> Result<(), DefinitionIssue> {
        if !self.status.is_enabled() {
            return Err(DefinitionIssue::Disabled {
                status: self.status.as_str().to_string(),
            });
        }
        if self.spreadsheet_id.is_empty() {
            return Err(DefinitionIssue::MissingSpreadsheetId);
        }
        if self.sheet_name.is_empty() {
            return Err(DefinitionIssue::MissingSheetName);
        }
        Ok(())
    }
}
