//! Catalog persistence, error-message and serialization tests.
//! Storage: ~/.fieldsync/catalog.yaml

use assert_fs::prelude::*;
use fieldsync_core::{
    catalog::CatalogState, yaml_catalog, CatalogError, CatalogStore, DatabaseId, FieldId,
    FieldUpdate, NewField, SemanticType, Table, TableId, YamlCatalog,
};
use predicates::prelude::predicate;
use rstest::rstest;
use std::fs;

fn users() -> Table {
    Table {
        id: TableId(10),
        db_id: DatabaseId(1),
        schema: Some("public".into()),
        name: "users".into(),
    }
}

fn new_field(name: &str, special_type: Option<SemanticType>) -> NewField {
    NewField {
        table_id: TableId(10),
        name: name.into(),
        display_name: name.into(),
        base_type: "type/Text".into(),
        special_type,
        parent_id: None,
    }
}

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".fieldsync/catalog.yaml")
        .write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = YamlCatalog::open_at(home.path()).unwrap_err();
    assert!(matches!(err, CatalogError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("catalog.yaml"), "must contain file path, got: {err}");
}

#[test]
fn load_wrong_type_yaml_returns_parse_error() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".fieldsync/catalog.yaml")
        .write_str("- this is a list, not a mapping\n")
        .expect("write");

    let err = YamlCatalog::open_at(home.path()).unwrap_err();
    assert!(matches!(err, CatalogError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn first_write_creates_catalog_file() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let catalog = YamlCatalog::open_at(home.path()).expect("open");
    home.child(".fieldsync/catalog.yaml")
        .assert(predicate::path::missing());

    catalog.create(new_field("email", Some(SemanticType::Email))).expect("create");
    home.child(".fieldsync/catalog.yaml")
        .assert(predicate::path::exists());
    home.child(".fieldsync/catalog.yaml")
        .assert(predicate::str::contains("type/Email"));
}

#[test]
fn stale_tmp_from_crash_does_not_affect_load() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let catalog = YamlCatalog::open_at(home.path()).expect("open");
    catalog.create(new_field("email", None)).expect("create");
    let original_bytes = fs::read(catalog.path()).expect("read original");

    // Simulate crash: .tmp written but process died before rename
    home.child(".fieldsync/catalog.yaml.tmp")
        .write_str("CRASH - INCOMPLETE WRITE")
        .expect("write crash tmp");

    let reopened = YamlCatalog::open_at(home.path()).expect("reopen");
    assert_eq!(fs::read(reopened.path()).expect("read"), original_bytes);
    assert_eq!(reopened.fields(&users()).expect("list").len(), 1);
}

// ---------------------------------------------------------------------------
// 3. Store semantics through the trait object
// ---------------------------------------------------------------------------

#[test]
fn yaml_catalog_behaves_as_a_store() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let store: Box<dyn CatalogStore> = Box::new(YamlCatalog::open_at(home.path()).expect("open"));

    let id = store.create(new_field("Score", None)).expect("create");
    store
        .update(
            id,
            FieldUpdate {
                base_type: Some("type/Float".into()),
                special_type: Some(SemanticType::Score),
            },
        )
        .expect("update");
    assert_eq!(
        store.retire_matching(&users(), &["score".into()]).expect("retire"),
        1
    );
    assert_eq!(store.find_inactive_by_name(&users(), "SCORE").expect("find"), Some(id));

    let state = yaml_catalog::load(&home.path().join(".fieldsync/catalog.yaml")).expect("load");
    let field = &state.fields[0];
    assert_eq!(field.base_type.0, "type/Float");
    assert_eq!(field.special_type, Some(SemanticType::Score));
    assert!(!field.active);
}

#[test]
fn update_of_unknown_field_is_not_found() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let catalog = YamlCatalog::open_at(home.path()).expect("open");
    let err = catalog.update(FieldId(42), FieldUpdate::default()).unwrap_err();
    assert!(err.to_string().contains("field 42 not found"), "got: {err}");
}

// ---------------------------------------------------------------------------
// 4. Serialization
// ---------------------------------------------------------------------------

#[rstest]
#[case::empty(CatalogState::default())]
#[case::populated({
    let mut state = CatalogState::default();
    state.create(new_field("id", Some(SemanticType::PK))).expect("create");
    state.create(new_field("город", None)).expect("create");
    state.retire_matching(TableId(10), &["ГОРОД".to_string()]);
    state
})]
fn catalog_state_yaml_roundtrip(#[case] state: CatalogState) {
    let yaml = serde_yaml::to_string(&state).expect("serialize");
    let back: CatalogState = serde_yaml::from_str(&yaml).expect("deserialize");
    assert_eq!(back, state);
}
