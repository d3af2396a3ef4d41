use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sheetgate_common::{CellValue, RangeAddress};

use super::memory::{MemoryBackend, SpreadsheetMap};
use crate::error::StoreError;
use crate::traits::{SheetBackend, TableRef, ValueGrid, WriteAck};

/// On-disk layout: `{"spreadsheets": {id: {sheet: [[cell, ...], ...]}}}`.
#[derive(Serialize, Deserialize, Debug, Default)]
struct JsonSpreadsheets {
    #[serde(default)]
    spreadsheets: SpreadsheetMap,
}

/// Backend over a JSON document of spreadsheets.
///
/// Cells live in memory; when the backend was opened from a path, every write
/// is persisted back to that path before it is acknowledged.
#[derive(Debug, Default)]
pub struct JsonFileBackend {
    inner: MemoryBackend,
    path: Option<PathBuf>,
}

impl JsonFileBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let doc: JsonSpreadsheets = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self {
            inner: MemoryBackend::from_spreadsheets(doc.spreadsheets),
            path: Some(path.to_path_buf()),
        })
    }

    /// Load from a string. The result is not tied to any file.
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let doc: JsonSpreadsheets = serde_json::from_str(json)?;
        Ok(Self {
            inner: MemoryBackend::from_spreadsheets(doc.spreadsheets),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Direct access to the cells, e.g. to seed tables.
    pub fn memory(&self) -> &MemoryBackend {
        &self.inner
    }

    pub fn to_json_string(&self) -> Result<String, StoreError> {
        let doc = JsonSpreadsheets {
            spreadsheets: self.inner.snapshot(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Write the document to `path`.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let json = self.to_json_string()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Write the document back to the path it was opened from, if any.
    pub fn save(&self) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => self.save_to(path),
            None => Ok(()),
        }
    }
}

impl SheetBackend for JsonFileBackend {
    type Error = StoreError;

    fn fetch_range(&self, table: &TableRef) -> Result<ValueGrid, StoreError> {
        self.inner.fetch_range(table)
    }

    fn write_range(
        &self,
        table: &TableRef,
        range: &RangeAddress,
        values: Vec<Vec<CellValue>>,
    ) -> Result<WriteAck, StoreError> {
        let ack = self.inner.write_range(table, range, values)?;
        self.save()?;
        Ok(ack)
    }
}
