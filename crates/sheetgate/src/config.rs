use std::path::Path;

use serde::{Deserialize, Serialize};
use sheetgate_store::TableRef;
use thiserror::Error;

/// Largest page a read may return, whatever the configuration says.
pub const HARD_LIMIT_CAP: usize = 100;

pub const DEFAULT_CONTROL_SHEET: &str = "GSHEET_AS_API";

pub const ENV_CONTROL_SPREADSHEET_ID: &str = "SHEETGATE_CONTROL_SPREADSHEET_ID";
pub const ENV_CONTROL_SHEET: &str = "SHEETGATE_CONTROL_SHEET";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Where the control table lives and how reads are paged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    pub control_spreadsheet_id: String,
    /// Sheet holding the definitions, also called the catalog category.
    pub control_sheet: String,
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            control_spreadsheet_id: String::new(),
            control_sheet: DEFAULT_CONTROL_SHEET.to_string(),
            default_limit: HARD_LIMIT_CAP,
            max_limit: HARD_LIMIT_CAP,
        }
    }
}

impl GatewayConfig {
    pub fn new(control_spreadsheet_id: impl Into<String>) -> Self {
        Self {
            control_spreadsheet_id: control_spreadsheet_id.into(),
            ..Self::default()
        }
    }

    pub fn with_control_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.control_sheet = sheet.into();
        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Defaults overlaid with the `SHEETGATE_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Override fields from the environment where the variables are set and non-empty.
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |key: &str| lookup(key).filter(|value| !value.is_empty());
        if let Some(id) = present(ENV_CONTROL_SPREADSHEET_ID) {
            self.control_spreadsheet_id = id;
        }
        if let Some(sheet) = present(ENV_CONTROL_SHEET) {
            self.control_sheet = sheet;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_sheet.is_empty() {
            return Err(ConfigError::Invalid("control_sheet is empty".into()));
        }
        if self.max_limit == 0 || self.max_limit > HARD_LIMIT_CAP {
            return Err(ConfigError::Invalid(format!(
                "max_limit must be between 1 and {HARD_LIMIT_CAP}, got {}",
                self.max_limit
            )));
        }
        if self.default_limit == 0 {
            return Err(ConfigError::Invalid("default_limit must be positive".into()));
        }
        Ok(())
    }

    /// Page size cap actually enforced.
    pub fn effective_max_limit(&self) -> usize {
        self.max_limit.clamp(1, HARD_LIMIT_CAP)
    }

    /// The table the catalog is loaded from.
    pub fn control_table(&self) -> TableRef {
        TableRef::new(&self.control_spreadsheet_id, &self.control_sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.control_sheet, "GSHEET_AS_API");
        assert_eq!(config.default_limit, 100);
        assert_eq!(config.max_limit, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn yaml_fills_missing_fields() {
        let config = GatewayConfig::from_yaml_str("control_spreadsheet_id: abc\nmax_limit: 20\n")
            .unwrap();
        assert_eq!(config.control_spreadsheet_id, "abc");
        assert_eq!(config.control_sheet, DEFAULT_CONTROL_SHEET);
        assert_eq!(config.max_limit, 20);
    }

    #[test]
    fn max_limit_cannot_exceed_cap() {
        let err = GatewayConfig::from_yaml_str("max_limit: 500").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            GatewayConfig::from_yaml_str("limit: 5"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn env_overrides_only_set_values() {
        let config = GatewayConfig::new("from-file").merge_vars(|key| match key {
            ENV_CONTROL_SHEET => Some("Apis".to_string()),
            ENV_CONTROL_SPREADSHEET_ID => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.control_spreadsheet_id, "from-file");
        assert_eq!(config.control_sheet, "Apis");
    }
}
