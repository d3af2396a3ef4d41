use serde_json::{Value, json};
use sheetgate::{
    Body, Gateway, GatewayConfig, GatewayError, Request, Scope, TOTAL_COUNT_HEADER, TableRef,
};
use sheetgate_store::MemoryBackend;

const CONTROL_ID: &str = "control";

fn cells(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| json!(v)).collect()
}

fn people() -> TableRef {
    TableRef::new("crm", "People")
}

fn backend() -> MemoryBackend {
    let config = GatewayConfig::new(CONTROL_ID);
    MemoryBackend::new()
        .with_table(
            &config.control_table(),
            vec![
                cells(&["apiName", "status", "spreadsheetId", "sheetName", "Read", "Write"]),
                cells(&[
                    "People",
                    "Enable",
                    "crm",
                    "People",
                    r#"{"enable": true, "fields": ["name", "city"]}"#,
                    r#"{"enable": true, "fields": ["name", "city", "age"]}"#,
                ]),
                cells(&["drafts", "Draft", "crm", "Missing", r#"{"enable": true}"#, ""]),
                cells(&["nosheet", "Enable", "crm", "", r#"{"enable": true}"#, ""]),
                cells(&["readonly", "Enable", "crm", "People", r#"{"enable": true}"#, ""]),
                cells(&["writeonly", "Enable", "crm", "People", "", r#"{"enable": true}"#]),
            ],
        )
        .with_table(
            &people(),
            vec![
                cells(&["name", "city", "age", "email"]),
                cells(&["ann", "Oslo", "31", "ann@x"]),
                cells(&["bob", "Rome", "27", "bob@x"]),
                cells(&["cy", "Oslo", "45", "cy@x"]),
                cells(&["di", "Lima", "27", "di@x"]),
            ],
        )
}

fn gateway(backend: &MemoryBackend) -> Gateway<'_, MemoryBackend> {
    Gateway::new(backend, GatewayConfig::new(CONTROL_ID))
}

fn json_body(body: &Body) -> &Value {
    match body {
        Body::Json(value) => value,
        Body::Text(text) => panic!("expected JSON body, got text: {text}"),
    }
}

#[test]
fn index_says_hello() {
    let backend = MemoryBackend::new();
    let response = gateway(&backend).handle(&Request::get("/"));
    assert_eq!(response.status, 200);
    assert_eq!(
        json_body(&response.body),
        &json!({"status": "OK", "message": "Hello sheetgate"})
    );
}

#[test]
fn get_filters_sorts_pages_and_projects() {
    let backend = backend();
    let response = gateway(&backend).handle(
        &Request::get("/people")
            .with_query("q", r#"{"city": "Oslo"}"#)
            .with_query("sort", "-age")
            .with_query("limit", "1"),
    );
    assert_eq!(response.status, 200);
    assert_eq!(response.header(TOTAL_COUNT_HEADER), Some("2"));
    assert_eq!(
        json_body(&response.body),
        &json!({
            "records": [{"name": "cy", "city": "Oslo"}],
            "limit": 1,
            "offset": 0
        })
    );
}

#[test]
fn multi_key_sort_uses_first_key_as_primary() {
    let backend = backend();
    let result = gateway(&backend)
        .read("readonly", [("sort", "age,name")])
        .unwrap();
    let names: Vec<&str> = result
        .records
        .iter()
        .filter_map(|r| r.get("name").and_then(Value::as_str))
        .collect();
    assert_eq!(names, ["bob", "di", "ann", "cy"]);
}

#[test]
fn unknown_filter_fields_are_ignored() {
    let backend = backend();
    let result = gateway(&backend)
        .read("readonly", [("q", r#"{"planet": "Mars"}"#)])
        .unwrap();
    assert_eq!(result.total, 4);
}

#[test]
fn offset_past_end_is_an_empty_page() {
    let backend = backend();
    let result = gateway(&backend)
        .read("readonly", [("offset", "10"), ("limit", "500")])
        .unwrap();
    assert!(result.records.is_empty());
    assert_eq!(result.limit, 100);
    assert_eq!(result.total, 4);
}

#[test]
fn status_codes() {
    let backend = backend();
    let gw = gateway(&backend);
    let status = |request: Request| gw.handle(&request).status;

    assert_eq!(status(Request::get("/unknown")), 503);
    assert_eq!(status(Request::get("/drafts")), 503);
    assert_eq!(status(Request::get("/nosheet")), 503);
    assert_eq!(status(Request::get("/writeonly")), 503);
    assert_eq!(status(Request::post("/readonly", "[]")), 503);
    assert_eq!(status(Request::get("/people").with_query("sort", "shoe")), 500);
    assert_eq!(status(Request::get("/people").with_query("sort", "name,")), 500);
    assert_eq!(status(Request::get("/people").with_query("sort", "-")), 500);
    assert_eq!(status(Request::get("/people").with_query("sort", "")), 200);
    assert_eq!(status(Request::get("/people").with_query("q", "[1]")), 400);
    assert_eq!(status(Request::post("/people", r#"{"name": "x"}"#)), 400);
    assert_eq!(status(Request::get("/a/b")), 404);
}

#[test]
fn error_messages() {
    let backend = backend();
    let gw = gateway(&backend);
    insta::assert_snapshot!(
        gw.handle(&Request::get("/unknown")).body_text(),
        @"api `unknown` is not supported"
    );
    insta::assert_snapshot!(
        gw.handle(&Request::get("/writeonly")).body_text(),
        @"read access to `writeonly` is not enabled"
    );
    insta::assert_snapshot!(
        gw.handle(&Request::get("/nosheet")).body_text(),
        @"api `nosheet` is misconfigured: sheetName is empty"
    );
    insta::assert_snapshot!(
        gw.handle(&Request::get("/people").with_query("sort", "shoe")).body_text(),
        @"there is no field called `shoe` for sorting"
    );
}

#[test]
fn disabled_definitions_never_touch_their_table() {
    // `drafts` points at a sheet that does not exist; a fetch would be a backend failure.
    let backend = backend();
    let err = gateway(&backend).read("drafts", Vec::<(String, String)>::new()).unwrap_err();
    assert!(matches!(
        err,
        GatewayError::NotEnabled {
            scope: Scope::Definition,
            ..
        }
    ));
}

#[test]
fn post_projects_and_appends() {
    let backend = backend();
    let gw = gateway(&backend);
    let response = gw.handle(&Request::post(
        "/people",
        r#"[{"email": "eve@x", "name": "eve", "age": 22}, {"email": "only@x"}]"#,
    ));
    assert_eq!(response.status, 200);
    assert_eq!(
        json_body(&response.body),
        &json!({"values": [["eve", null, 22]], "updatedRows": 1})
    );

    let table = backend.table(&people()).unwrap();
    assert_eq!(table.len(), 6);
    assert_eq!(table[5], vec![json!("eve"), json!(""), json!(22)]);
}

#[test]
fn post_of_empty_objects_writes_nothing() {
    let backend = backend();
    let result = gateway(&backend).write("writeonly", "[{}]").unwrap();
    assert_eq!(result.updated_rows, 0);
    assert!(result.values.is_empty());
    assert_eq!(backend.write_count(), 0);
}

#[test]
fn bad_policy_fails_every_request() {
    let config = GatewayConfig::new(CONTROL_ID);
    let backend = MemoryBackend::new().with_table(
        &config.control_table(),
        vec![
            cells(&["apiName", "status", "spreadsheetId", "sheetName", "Read"]),
            cells(&["fine", "Enable", "crm", "People", r#"{"enable": true}"#]),
            cells(&["bad", "Enable", "crm", "People", "{enable"]),
        ],
    );
    let response = Gateway::new(&backend, config).handle(&Request::get("/fine"));
    assert_eq!(response.status, 500);
}

#[test]
fn missing_control_table_is_a_backend_failure() {
    let backend = MemoryBackend::new();
    let err = gateway(&backend).catalog().unwrap_err();
    assert!(matches!(err, GatewayError::BackendFailure(_)));
    assert_eq!(err.status_code(), 500);
}
