use serde_json::json;
use sheetgate_store::{JsonFileBackend, Row, SheetBackend, TableRef, TabularStore};

fn contacts() -> TableRef {
    TableRef::new("crm", "Contacts")
}

const DOC: &str = r#"{
  "spreadsheets": {
    "crm": {
      "Contacts": [["name", "email"], ["Ann", "ann@example.com"]]
    }
  }
}"#;

#[test]
fn appends_are_persisted_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheets.json");
    std::fs::write(&path, DOC).unwrap();

    let backend = JsonFileBackend::open_path(&path).unwrap();
    let new_row: Row = [("email", json!("bo@example.com")), ("name", json!("Bo"))]
        .into_iter()
        .collect();
    let outcome = TabularStore::new(&backend)
        .append(&contacts(), &[new_row])
        .unwrap();
    assert_eq!(outcome.ack.updated_cells, 2);

    let reopened = JsonFileBackend::open_path(&path).unwrap();
    let grid = reopened.fetch_range(&contacts()).unwrap();
    assert_eq!(grid.row_count(), 3);
    assert_eq!(grid.values[2], vec![json!("Bo"), json!("bo@example.com")]);
}

#[test]
fn unsaved_backend_round_trips_through_string() {
    let backend = JsonFileBackend::from_json_str(DOC).unwrap();
    let text = backend.to_json_string().unwrap();
    let again = JsonFileBackend::from_json_str(&text).unwrap();
    assert_eq!(
        again.fetch_range(&contacts()).unwrap(),
        backend.fetch_range(&contacts()).unwrap()
    );
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = JsonFileBackend::open_path(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, sheetgate_store::StoreError::Io(_)));
}
