use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use sheetgate_common::{CellValue, RangeAddress};

use crate::error::StoreError;
use crate::traits::{SheetBackend, TableRef, ValueGrid, WriteAck};

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// OAuth bearer token for an already-authorized session.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: String,
    major_dimension: &'static str,
    values: &'a [Vec<CellValue>],
}

/// Google Sheets v4 `values` endpoints over a blocking client.
#[derive(Debug, Clone)]
pub struct SheetsApiBackend {
    client: Client,
    base_url: Url,
    token: AccessToken,
}

impl SheetsApiBackend {
    pub fn new(token: AccessToken) -> Result<Self, StoreError> {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    /// Point the client at another host, such as a local emulator.
    pub fn with_base_url(base_url: &str, token: AccessToken) -> Result<Self, StoreError> {
        let base_url =
            Url::parse(base_url).map_err(|e| StoreError::Endpoint(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Endpoint(base_url.to_string()));
        }
        Ok(Self {
            client: Client::builder().build()?,
            base_url,
            token,
        })
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}` with each part escaped.
    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Endpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
        Ok(url)
    }

    fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl SheetBackend for SheetsApiBackend {
    type Error = StoreError;

    fn fetch_range(&self, table: &TableRef) -> Result<ValueGrid, StoreError> {
        let url = self.values_url(&table.spreadsheet_id, &table.sheet_name)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(self.token.as_str())
            .send()?;
        Ok(Self::check(response)?.json::<ValueGrid>()?)
    }

    fn write_range(
        &self,
        table: &TableRef,
        range: &RangeAddress,
        values: Vec<Vec<CellValue>>,
    ) -> Result<WriteAck, StoreError> {
        let a1 = range.to_string();
        let mut url = self.values_url(&table.spreadsheet_id, &a1)?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        let body = ValueRange {
            range: a1,
            major_dimension: "ROWS",
            values: &values,
        };
        let response = self
            .client
            .put(url)
            .bearer_auth(self.token.as_str())
            .json(&body)
            .send()?;
        Ok(Self::check(response)?.json::<WriteAck>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_url_escapes_segments() {
        let backend =
            SheetsApiBackend::with_base_url("http://localhost:8080/", AccessToken::new("t"))
                .unwrap();
        let url = backend.values_url("abc", "My Sheet!A1:B2").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v4/spreadsheets/abc/values/My%20Sheet!A1:B2"
        );
    }

    #[test]
    fn token_is_not_printed() {
        assert_eq!(format!("{:?}", AccessToken::new("secret")), "AccessToken(..)");
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(matches!(
            SheetsApiBackend::with_base_url("mailto:x@y", AccessToken::new("t")),
            Err(StoreError::Endpoint(_))
        ));
    }
}
