use std::fmt;

use sheetgate_spec::{DefinitionError, DefinitionIssue};
use sheetgate_store::StoreError;
use thiserror::Error;

/// What a `NotEnabled` error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The definition's own `status`.
    Definition,
    Read,
    Write,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Definition => f.write_str("api"),
            Scope::Read => f.write_str("read access to"),
            Scope::Write => f.write_str("write access to"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("api `{name}` is not supported")]
    NotFound { name: String },

    #[error("{scope} `{name}` is not enabled")]
    NotEnabled { name: String, scope: Scope },

    #[error("api `{name}` is misconfigured: {issue}")]
    Misconfigured { name: String, issue: DefinitionIssue },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("there is no field called `{field}` for sorting")]
    InvalidSortField { field: String },

    #[error(transparent)]
    InvalidPolicy(#[from] DefinitionError),

    #[error(transparent)]
    BackendFailure(#[from] StoreError),
}

impl GatewayError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::NotFound { .. }
            | GatewayError::NotEnabled { .. }
            | GatewayError::Misconfigured { .. } => 503,
            GatewayError::BadRequest(_) => 400,
            GatewayError::InvalidSortField { .. }
            | GatewayError::InvalidPolicy(_)
            | GatewayError::BackendFailure(_) => 500,
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        GatewayError::BadRequest(message.into())
    }
}
