use sheetgate_common::RangeError;
use thiserror::Error;

use crate::traits::TableRef;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Any failure raised by a backend while serving one table.
    #[error("backend failure on `{table}`: {source}")]
    Backend {
        table: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("table `{table}` does not exist")]
    TableNotFound { table: String },

    #[error("{rows}x{cols} values do not fit range {range}")]
    RangeOverflow {
        range: String,
        rows: usize,
        cols: usize,
    },

    #[error("invalid range: {0}")]
    Range(#[from] RangeError),

    #[error("backend responded with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid backend endpoint: {0}")]
    Endpoint(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "webservice")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl StoreError {
    /// Wrap a backend-specific error with the table it was raised for.
    pub fn from_backend<E>(table: &TableRef, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend {
            table: table.to_string(),
            source: Box::new(err),
        }
    }

    pub fn table_not_found(table: &TableRef) -> Self {
        StoreError::TableNotFound {
            table: table.to_string(),
        }
    }
}
