use serde::Serialize;
use sheetgate_common::Row;

use crate::error::GatewayError;
use crate::params::ReadParams;

/// One page of a read, plus the filtered total reported out of band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadResult {
    pub records: Vec<Row>,
    pub limit: usize,
    pub offset: usize,
    #[serde(skip)]
    pub total: usize,
}

/// Filtering, sorting, paging and projection over fetched rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine;

impl QueryEngine {
    /// Shape `rows` for a read response.
    ///
    /// Steps run in a fixed order: filter, sort, page, project. `total` counts
    /// the rows left after filtering.
    pub fn read(
        &self,
        rows: Vec<Row>,
        params: &ReadParams,
        allow: Option<&[String]>,
    ) -> Result<ReadResult, GatewayError> {
        let mut rows = params.filter.apply(rows);
        params.sort.apply(&mut rows)?;
        let total = rows.len();

        let page = params.page.apply(rows);
        let records = match allow {
            Some(fields) => page.iter().map(|row| row.project(fields)).collect(),
            None => page,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(total, returned = records.len(), "read shaped");

        Ok(ReadResult {
            records,
            limit: params.page.limit,
            offset: params.page.offset,
            total,
        })
    }

    /// Reduce write payload rows to the allow-list, if there is one.
    pub fn write(&self, rows: Vec<Row>, allow: Option<&[String]>) -> Vec<Row> {
        match allow {
            Some(fields) => rows.iter().map(|row| row.project(fields)).collect(),
            None => rows,
        }
    }
}
