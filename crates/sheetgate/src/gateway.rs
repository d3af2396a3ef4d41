//! Transport-neutral request surface.
//!
//! A [`Gateway`] maps the REST contract (method, resource name, decoded query
//! pairs, raw body) to a [`Response`] value. HTTP frameworks mount it by
//! translating their request type into [`Request`] and copying the response
//! status, headers and body back out.

use std::str::FromStr;

use serde::Serialize;
use serde_json::{Value as JsonValue, json};
use sheetgate_common::{CellValue, Row};
use sheetgate_spec::ApiDefinition;
use sheetgate_store::{SheetBackend, TableRef, TabularStore};

use crate::catalog::SchemaCatalog;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Scope};
use crate::params::ReadParams;
use crate::query::{QueryEngine, ReadResult};

pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            other => Err(format!("unsupported method `{other}`")),
        }
    }
}

/// Request as seen relative to the gateway's mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// `/` for the index, `/{apiName}` for a resource.
    pub path: String,
    /// Query pairs, already percent-decoded.
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body.into()),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(JsonValue),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl Response {
    pub fn json(status: u16, value: JsonValue) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Json(value),
        }
    }

    pub fn text(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Text(message.into()),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body rendered as text: JSON compactly, plain text as is.
    pub fn body_text(&self) -> String {
        match &self.body {
            Body::Json(value) => value.to_string(),
            Body::Text(text) => text.clone(),
        }
    }
}

impl From<GatewayError> for Response {
    fn from(err: GatewayError) -> Self {
        Response::text(err.status_code(), err.to_string())
    }
}

/// Acknowledgement body of a write.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    pub values: Vec<Vec<CellValue>>,
    pub updated_rows: usize,
}

/// Serves resources declared in the control table over one backend.
pub struct Gateway<'a, B: SheetBackend> {
    store: TabularStore<'a, B>,
    config: GatewayConfig,
    engine: QueryEngine,
}

impl<'a, B: SheetBackend> Gateway<'a, B> {
    pub fn new(backend: &'a B, config: GatewayConfig) -> Self {
        Self {
            store: TabularStore::new(backend),
            config,
            engine: QueryEngine,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Fresh snapshot of the control table.
    pub fn catalog(&self) -> Result<SchemaCatalog, GatewayError> {
        SchemaCatalog::load(&self.store, &self.config.control_table())
    }

    fn resolve(&self, name: &str) -> Result<ApiDefinition, GatewayError> {
        self.catalog()?.resolve(name).cloned()
    }

    /// Resolve `name` and run a read against its table.
    pub fn read<K, V>(
        &self,
        name: &str,
        query: impl IntoIterator<Item = (K, V)>,
    ) -> Result<ReadResult, GatewayError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let def = self.resolve(name)?;
        if !def.read.enable {
            return Err(GatewayError::NotEnabled {
                name: name.to_string(),
                scope: Scope::Read,
            });
        }
        let params = ReadParams::from_query(query, &self.config)?;
        let rows = self.store.fetch_all(&table_of(&def))?;
        self.engine.read(rows, &params, def.read.allow_list())
    }

    /// Resolve `name` and append the rows of a JSON array body to its table.
    pub fn write(&self, name: &str, body: &str) -> Result<WriteResult, GatewayError> {
        let def = self.resolve(name)?;
        if !def.write.enable {
            return Err(GatewayError::NotEnabled {
                name: name.to_string(),
                scope: Scope::Write,
            });
        }
        let rows = parse_rows(body)?;
        let payload = self.engine.write(rows, def.write.allow_list());
        let outcome = self.store.append(&table_of(&def), &payload)?;
        Ok(WriteResult {
            values: outcome.values,
            updated_rows: outcome.ack.updated_rows,
        })
    }

    /// `GET /`: liveness probe.
    pub fn index(&self) -> Response {
        Response::json(200, json!({"status": "OK", "message": "Hello sheetgate"}))
    }

    /// `GET /{name}`.
    pub fn get(&self, name: &str, query: &[(String, String)]) -> Response {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("get", api = name).entered();

        let result = self
            .read(name, query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .map(|result| {
                let body = json!({
                    "records": result.records,
                    "limit": result.limit,
                    "offset": result.offset,
                });
                Response::json(200, body).with_header(TOTAL_COUNT_HEADER, result.total.to_string())
            });
        finish(result)
    }

    /// `POST /{name}`.
    pub fn post(&self, name: &str, body: &str) -> Response {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("post", api = name).entered();

        let result = self.write(name, body).map(|ack| {
            Response::json(
                200,
                json!({"values": ack.values, "updatedRows": ack.updated_rows}),
            )
        });
        finish(result)
    }

    /// Route a request by method and path.
    pub fn handle(&self, request: &Request) -> Response {
        let path = request.path.trim_matches('/');
        match (request.method, path) {
            (Method::Get, "") => self.index(),
            (_, "") => Response::text(405, "method not allowed"),
            (_, name) if name.contains('/') => Response::text(404, "not found"),
            (Method::Get, name) => self.get(name, &request.query),
            (Method::Post, name) => self.post(name, request.body.as_deref().unwrap_or_default()),
        }
    }
}

fn table_of(def: &ApiDefinition) -> TableRef {
    TableRef::new(&def.spreadsheet_id, &def.sheet_name)
}

/// A write body must be a JSON array whose elements are all objects.
fn parse_rows(body: &str) -> Result<Vec<Row>, GatewayError> {
    const SHAPE: &str = "the body should be an array of objects";
    let value: JsonValue = serde_json::from_str(body)
        .map_err(|e| GatewayError::bad_request(format!("{SHAPE}: {e}")))?;
    let JsonValue::Array(items) = value else {
        return Err(GatewayError::bad_request(SHAPE));
    };
    items
        .into_iter()
        .map(|item| match item {
            JsonValue::Object(map) => Ok(Row::from(map)),
            _ => Err(GatewayError::bad_request(SHAPE)),
        })
        .collect()
}

fn finish(result: Result<Response, GatewayError>) -> Response {
    match result {
        Ok(response) => response,
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(status = err.status_code(), error = %err, "request failed");
            Response::from(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_parse_case_insensitively() {
        assert_eq!("get".parse::<Method>(), Ok(Method::Get));
        assert_eq!("POST".parse::<Method>(), Ok(Method::Post));
        assert!("DELETE".parse::<Method>().is_err());
    }

    #[test]
    fn write_bodies_must_be_arrays_of_objects() {
        assert_eq!(parse_rows("[]").unwrap(), Vec::<Row>::new());
        assert_eq!(parse_rows(r#"[{"a": 1}]"#).unwrap().len(), 1);
        for bad in ["{}", "[1]", r#"[{"a":1}, "x"]"#, "not json"] {
            assert!(
                matches!(parse_rows(bad), Err(GatewayError::BadRequest(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = Response::json(200, json!({})).with_header(TOTAL_COUNT_HEADER, "3");
        assert_eq!(response.header("x-total-count"), Some("3"));
        assert!(response.is_success());
    }
}
