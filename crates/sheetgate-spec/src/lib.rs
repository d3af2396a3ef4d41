//! Resource definitions for sheetgate.
//!
//! A resource (an "API") is declared as one row of a control table. This crate
//! owns the row contract ([`columns`]), the typed [`ApiDefinition`] built from a
//! row, the [`AccessPolicy`] parsed out of the JSON-encoded `Read`/`Write`
//! columns, and the validity rules that decide whether a definition may serve
//! requests.

mod definition;
mod policy;

pub use definition::{
    ApiDefinition, DefinitionError, DefinitionIssue, DefinitionStatus, ENABLED_STATUS, columns,
    normalize_api_name,
};
pub use policy::{AccessPolicy, PolicyColumn};
