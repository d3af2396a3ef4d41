use sheetgate_common::Row;
use sheetgate_spec::{ApiDefinition, DefinitionError, DefinitionIssue};
use sheetgate_store::{SheetBackend, TableRef, TabularStore};

use crate::error::{GatewayError, Scope};

/// Every definition read from one control table, in row order.
///
/// A catalog is a snapshot: build a new one for each request so edits to the
/// control table take effect immediately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaCatalog {
    definitions: Vec<ApiDefinition>,
}

impl SchemaCatalog {
    /// Load the catalog stored in `control`.
    ///
    /// One unparseable policy cell fails the whole load.
    pub fn load<B: SheetBackend>(
        store: &TabularStore<'_, B>,
        control: &TableRef,
    ) -> Result<Self, GatewayError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("catalog_load", control = %control).entered();

        let rows = store.fetch_all(control)?;
        let catalog = Self::from_rows(&rows)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(definitions = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn from_rows(rows: &[Row]) -> Result<Self, DefinitionError> {
        let definitions = rows
            .iter()
            .map(ApiDefinition::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { definitions })
    }

    pub fn from_definitions(definitions: Vec<ApiDefinition>) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &[ApiDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// First definition whose name matches `name`, usable or not.
    pub fn find(&self, name: &str) -> Option<&ApiDefinition> {
        self.definitions.iter().find(|def| def.matches(name))
    }

    /// Resolve `name` to a definition that may serve requests.
    ///
    /// Checks run in order: existence, then status, then table coordinates.
    pub fn resolve(&self, name: &str) -> Result<&ApiDefinition, GatewayError> {
        let def = self.find(name).ok_or_else(|| GatewayError::NotFound {
            name: name.to_string(),
        })?;
        match def.validate() {
            Ok(()) => Ok(def),
            Err(DefinitionIssue::Disabled { .. }) => Err(GatewayError::NotEnabled {
                name: name.to_string(),
                scope: Scope::Definition,
            }),
            Err(issue) => Err(GatewayError::Misconfigured {
                name: name.to_string(),
                issue,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetgate_spec::AccessPolicy;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::from_definitions(vec![
            ApiDefinition::new("", "id", "Blank"),
            ApiDefinition::new("Orders", "book", "Orders").with_read(AccessPolicy::enabled()),
            ApiDefinition::new("orders", "other", "Dupes"),
            ApiDefinition::new("drafts", "book", "Drafts").with_status("Draft"),
            ApiDefinition::new("broken", "book", ""),
        ])
    }

    #[test]
    fn first_match_wins() {
        let def = catalog().resolve(" ORDERS ").map(|d| d.sheet_name.clone());
        assert_eq!(def.unwrap(), "Orders");
    }

    #[test]
    fn resolution_failures() {
        let catalog = catalog();
        assert!(matches!(
            catalog.resolve("missing"),
            Err(GatewayError::NotFound { .. })
        ));
        assert!(matches!(catalog.resolve(""), Err(GatewayError::NotFound { .. })));
        assert!(matches!(
            catalog.resolve("drafts"),
            Err(GatewayError::NotEnabled {
                scope: Scope::Definition,
                ..
            })
        ));
        assert!(matches!(
            catalog.resolve("broken"),
            Err(GatewayError::Misconfigured {
                issue: DefinitionIssue::MissingSheetName,
                ..
            })
        ));
    }
}
