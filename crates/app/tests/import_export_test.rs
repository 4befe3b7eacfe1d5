//! Integration tests for profile export and import
//!
//! Exports from one store and imports into a fresh one, checking that field
//! values survive while every id is regenerated.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use openheaders_application::{FilterPatch, HeaderPatch, StateStore};
use openheaders_domain::{FilterType, HeaderOperation, HeaderType, MatchType, Profile};
use openheaders_infrastructure::{
    MemoryKeyValueStore, ProfileImporter, QueuedStateWriter, StateRepository, SystemClock,
    export_json, write_export,
};

type Store = StateStore<QueuedStateWriter, SystemClock>;

fn fresh_store() -> Store {
    let repository = StateRepository::new(Arc::new(MemoryKeyValueStore::new()));
    let (writer, _task) = QueuedStateWriter::spawn(repository);
    StateStore::new(None, writer, SystemClock::new())
}

fn populate(store: &mut Store) -> String {
    let id = store.add_profile(Some("API"));
    let header = store.add_header(&id).expect("profile exists");
    store.update_header(
        &id,
        &header,
        HeaderPatch {
            name: Some("Authorization".to_string()),
            value: Some("Bearer token".to_string()),
            comment: Some("staging key".to_string()),
            ..HeaderPatch::default()
        },
    );
    let removed = store.add_header(&id).expect("profile exists");
    store.update_header(
        &id,
        &removed,
        HeaderPatch {
            name: Some("Server".to_string()),
            header_type: Some(HeaderType::Response),
            operation: Some(HeaderOperation::Remove),
            ..HeaderPatch::default()
        },
    );
    let filter = store.add_url_filter(&id).expect("profile exists");
    store.update_url_filter(
        &id,
        &filter,
        FilterPatch {
            match_type: Some(MatchType::HostEndsWith),
            pattern: Some("example.com".to_string()),
            ..FilterPatch::default()
        },
    );
    let excluded = store.add_url_filter(&id).expect("profile exists");
    store.update_url_filter(
        &id,
        &excluded,
        FilterPatch {
            match_type: Some(MatchType::from("legacy_kind".to_string())),
            pattern: Some("*/health*".to_string()),
            filter_type: Some(FilterType::Exclude),
            ..FilterPatch::default()
        },
    );
    id
}

fn assert_same_fields(original: &Profile, imported: &Profile) {
    assert_ne!(original.id, imported.id);
    assert_eq!(original.name, imported.name);
    assert_eq!(original.headers.len(), imported.headers.len());
    for (a, b) in original.headers.iter().zip(&imported.headers) {
        assert_ne!(a.id, b.id);
        assert_eq!(
            (&a.name, &a.value, &a.comment, a.operation, a.header_type, a.enabled),
            (&b.name, &b.value, &b.comment, b.operation, b.header_type, b.enabled)
        );
    }
    assert_eq!(original.url_filters.len(), imported.url_filters.len());
    for (a, b) in original.url_filters.iter().zip(&imported.url_filters) {
        assert_ne!(a.id, b.id);
        assert_eq!(
            (&a.match_type, &a.pattern, a.filter_type, a.enabled),
            (&b.match_type, &b.pattern, b.filter_type, b.enabled)
        );
    }
}

#[tokio::test]
async fn test_export_then_import_into_fresh_store() {
    let mut source = fresh_store();
    let id = populate(&mut source);
    let file = source.export_profiles(Some(std::slice::from_ref(&id)));
    let json = export_json(&file).expect("export should work");

    let mut target = fresh_store();
    assert!(ProfileImporter::new().import_into(&mut target, &json));

    let original = source.state().profile(&id).expect("source profile");
    let imported = target.state().profiles.last().expect("imported profile");
    assert_same_fields(original, imported);
    assert_eq!(target.state().profiles.len(), 2);

    // One undo removes the whole import.
    assert!(target.undo());
    assert_eq!(target.state().profiles.len(), 1);
}

#[tokio::test]
async fn test_reimport_into_same_store_never_reuses_ids() {
    let mut store = fresh_store();
    populate(&mut store);
    let json = export_json(&store.export_profiles(None)).expect("export should work");

    assert!(ProfileImporter::new().import_into(&mut store, &json));

    let mut ids: Vec<&str> = store.state().profiles.iter().map(|p| p.id.as_str()).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
    assert_eq!(total, 4);
}

#[tokio::test]
async fn test_export_file_roundtrip_on_disk() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("profiles.json");

    let mut store = fresh_store();
    populate(&mut store);
    let file = store.export_profiles(None);
    write_export(&path, &file).await.expect("export should be written");

    let result = ProfileImporter::new()
        .parse_file(&path)
        .await
        .expect("import should parse");
    assert_eq!(result.profiles.len(), file.profiles.len());
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn test_foreign_import() {
    let payload = r#"[
      {
        "title": "Foreign",
        "headers": [
          {"enabled": true, "name": "X-Append", "value": "a", "appendMode": true},
          {"enabled": true, "name": "X-Set", "value": "b"},
          {"enabled": true}
        ],
        "respHeaders": [{"enabled": true, "name": "X-Resp", "value": "c"}]
      },
      {"title": "Broken", "headers": "nope"}
    ]"#;

    let mut store = fresh_store();
    assert!(ProfileImporter::new().import_into(&mut store, payload));

    let imported = store.state().profiles.last().expect("imported profile");
    assert_eq!(imported.name, "Foreign");
    let ops: Vec<_> = imported.headers.iter().map(|h| (h.name.as_str(), h.operation)).collect();
    assert_eq!(
        ops,
        vec![
            ("X-Append", HeaderOperation::Append),
            ("X-Set", HeaderOperation::Set),
            ("X-Resp", HeaderOperation::Set),
        ]
    );
    assert_eq!(imported.headers[2].header_type, HeaderType::Response);
    assert!(imported.created_at > 0);
}

#[tokio::test]
async fn test_unrecognised_payload_fails_without_changes() {
    let mut store = fresh_store();
    let before = store.state().clone();

    let importer = ProfileImporter::new();
    assert!(!importer.import_into(&mut store, r#"{"hello": "world"}"#));
    assert!(!importer.import_into(&mut store, "[]"));
    assert!(!importer.import_into(&mut store, "definitely not json"));

    assert_eq!(store.state(), &before);
    assert!(!store.can_undo());
}
