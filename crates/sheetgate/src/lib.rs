//! Spreadsheet tables served as REST resources.
//!
//! Resources are declared as rows of a control table. Each request loads a
//! fresh [`SchemaCatalog`], resolves the requested name to an enabled
//! definition and then reads from or appends to the definition's table
//! through [`sheetgate_store::TabularStore`]. Reads are shaped by the
//! [`QueryEngine`]: filter, sort, page and project, in that order.
//!
//! [`Gateway`] ties these together behind a transport-neutral
//! request/response surface.

mod catalog;
mod config;
mod error;
mod gateway;
mod params;
mod query;

pub use catalog::SchemaCatalog;
pub use config::{
    ConfigError, DEFAULT_CONTROL_SHEET, ENV_CONTROL_SHEET, ENV_CONTROL_SPREADSHEET_ID,
    GatewayConfig, HARD_LIMIT_CAP,
};
pub use error::{GatewayError, Scope};
pub use gateway::{Body, Gateway, Method, Request, Response, TOTAL_COUNT_HEADER, WriteResult};
pub use params::{FilterSpec, Page, ReadParams, SortKey, SortSpec, leading_int};
pub use query::{QueryEngine, ReadResult};

pub use sheetgate_spec::{AccessPolicy, ApiDefinition};
pub use sheetgate_store::{SheetBackend, TableRef, TabularStore};
