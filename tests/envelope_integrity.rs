//! Envelope Integrity Tests
//!
//! Tests for invariants:
//! - Foreign or malformed files are never bound to a store
//! - Recoverable load failures are reported, not raised
//! - Persisted envelopes carry the header in a stable field order
//! - Converters rewrite field values on disk and restore them on load

use std::fs;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use stashdb::codec::DateTimeConverter;
use stashdb::store::StoreBuilder;
use stashdb::{
    CollectionStore, ConverterRegistry, ConverterScope, ConverterSet, DocumentPath, FileStorage,
    LoadOutcome, SingletonStore, StashConfig, StoreOptions, StoreState,
};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Note {
    title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Event {
    name: String,
    at: DateTime<Utc>,
}

fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

fn notes(dir: &TempDir) -> CollectionStore<Note> {
    StoreBuilder::new("notes", 0)
        .storage(Arc::new(FileStorage::new(dir.path())))
        .options(StoreOptions::manual())
        .collection()
        .unwrap()
}

fn write_notes_file(dir: &TempDir, text: &str) {
    fs::write(dir.path().join("storage.notes.json"), text).unwrap();
}

fn assert_skipped(store: &CollectionStore<Note>, code: &str) {
    match store.load().unwrap() {
        LoadOutcome::Skipped(err) => {
            assert_eq!(err.code(), code, "unexpected error: {}", err);
            assert!(!err.is_fatal());
        }
        other => panic!("expected skipped load, got {:?}", other),
    }
    assert!(store.is_empty());
    assert_eq!(store.state(), StoreState::Transient);
}

// =============================================================================
// Rejected Content
// =============================================================================

/// A file with a foreign discriminator is discarded.
#[test]
fn test_class_mismatch_discarded() {
    let dir = create_temp_dir();
    write_notes_file(
        &dir,
        r#"{"class":"com.example.Other","payloadTypeVersion":0,"payload":[{"title":"x"}]}"#,
    );
    assert_skipped(&notes(&dir), "STASH_CORRUPT_ENVELOPE");
}

#[test]
fn test_missing_version_discarded() {
    let dir = create_temp_dir();
    write_notes_file(&dir, r#"{"class":"stashdb.StoreMetadata","payload":[]}"#);
    assert_skipped(&notes(&dir), "STASH_CORRUPT_ENVELOPE");
}

#[test]
fn test_malformed_json_discarded() {
    let dir = create_temp_dir();
    write_notes_file(&dir, r#"{"class":"stashdb.StoreMetadata","#);
    assert_skipped(&notes(&dir), "STASH_CORRUPT_ENVELOPE");
}

/// A singleton envelope is not loaded by a collection store.
#[test]
fn test_shape_mismatch_discarded() {
    let dir = create_temp_dir();
    write_notes_file(
        &dir,
        r#"{"class":"stashdb.StoreMetadata","payloadTypeVersion":0,"singleton":true,"payload":null}"#,
    );
    assert_skipped(&notes(&dir), "STASH_CORRUPT_ENVELOPE");
}

/// Records that do not fit the type are discarded as a whole.
#[test]
fn test_unbindable_payload_discarded() {
    let dir = create_temp_dir();
    write_notes_file(
        &dir,
        r#"{"class":"stashdb.StoreMetadata","payloadTypeVersion":0,"singleton":false,
            "payload":[{"title":"ok"},{"title":42}]}"#,
    );
    assert_skipped(&notes(&dir), "STASH_DESERIALIZATION");
}

/// A collection payload that is not a sequence is discarded.
#[test]
fn test_non_sequence_collection_discarded() {
    let dir = create_temp_dir();
    write_notes_file(
        &dir,
        r#"{"class":"stashdb.StoreMetadata","payloadTypeVersion":0,"singleton":false,
            "payload":{"title":"lonely"}}"#,
    );
    assert_skipped(&notes(&dir), "STASH_DESERIALIZATION");
}

/// A discarded file does not block later saves.
#[test]
fn test_store_usable_after_discard() {
    let dir = create_temp_dir();
    write_notes_file(&dir, "not json at all");
    let store = notes(&dir);
    assert!(store.load().unwrap().skipped_error().is_some());

    store.add(Note { title: "fresh".into() });
    store.save().unwrap();

    let reader = notes(&dir);
    assert!(reader.load().unwrap().is_loaded());
    assert_eq!(reader.size(), 1);
}

/// A renamed file whose uid differs is still loaded.
#[test]
fn test_uid_mismatch_accepted() {
    let dir = create_temp_dir();
    write_notes_file(
        &dir,
        r#"{"class":"stashdb.StoreMetadata","uid":"old-notes","payloadTypeVersion":0,
            "singleton":false,"payload":[{"title":"kept"}]}"#,
    );
    let store = notes(&dir);
    assert!(store.load().unwrap().is_loaded());
    assert!(store.contains(&Note { title: "kept".into() }));
}

// =============================================================================
// Persisted Shape
// =============================================================================

/// Header fields are written in a fixed order and `modified` is stamped.
#[test]
fn test_envelope_field_order() {
    let dir = create_temp_dir();
    let store = notes(&dir);
    store.add(Note { title: "a".into() });
    store.save().unwrap();

    let text = fs::read_to_string(dir.path().join("storage.notes.json")).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["class", "uid", "payloadTypeVersion", "singleton", "created", "modified", "payload"]
    );
    assert_eq!(value["class"], "stashdb.StoreMetadata");
    assert_eq!(value["singleton"], false);
    assert!(store.metadata().modified().is_some());
}

/// An absent singleton value persists as null.
#[test]
fn test_absent_singleton_is_null_payload() {
    let dir = create_temp_dir();
    let store: SingletonStore<Note> =
        SingletonStore::new("pinned", 0, Arc::new(FileStorage::new(dir.path()))).unwrap();
    store.set(None);

    let text = fs::read_to_string(dir.path().join("storage.singleton.pinned.json")).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["singleton"], true);
    assert!(value["payload"].is_null());
}

// =============================================================================
// Converters
// =============================================================================

/// A date converter writes the configured pattern and reads it back.
#[test]
fn test_date_converter_on_disk() {
    let dir = create_temp_dir();
    let mut registry = ConverterRegistry::default();
    registry.configure(
        "events",
        ConverterSet::new().with(
            ConverterScope::Path(DocumentPath::parse("at").unwrap()),
            DateTimeConverter::new("%Y-%m-%d %H:%M:%S"),
        ),
    );

    let build = || -> CollectionStore<Event> {
        StoreBuilder::new("events", 0)
            .storage(Arc::new(FileStorage::new(dir.path())))
            .converters(&registry)
            .options(StoreOptions::manual())
            .collection()
            .unwrap()
    };

    let event = Event {
        name: "launch".into(),
        at: Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
    };
    let store = build();
    store.add(event.clone());
    store.save().unwrap();

    let on_disk: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("storage.events.json")).unwrap())
            .unwrap();
    assert_eq!(on_disk["payload"][0]["at"], "2024-05-06 07:08:09");

    let reader = build();
    reader.load().unwrap();
    assert!(reader.contains(&event));
}

/// A pattern chrono cannot render fails the save instead of panicking.
#[test]
fn test_invalid_date_pattern_fails_save() {
    let dir = create_temp_dir();
    let mut registry = ConverterRegistry::default();
    registry.configure(
        "events",
        ConverterSet::new().with(
            ConverterScope::Path(DocumentPath::parse("at").unwrap()),
            DateTimeConverter::new("%Y-%Q"),
        ),
    );
    let store: CollectionStore<Event> = StoreBuilder::new("events", 0)
        .storage(Arc::new(FileStorage::new(dir.path())))
        .converters(&registry)
        .collection()
        .unwrap();

    // Auto-save failure is logged; the record stays in memory.
    assert!(store.add(Event {
        name: "launch".into(),
        at: Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
    }));
    assert_eq!(store.size(), 1);
    assert!(!dir.path().join("storage.events.json").exists());

    let err = store.save().unwrap_err();
    assert_eq!(err.code(), "STASH_SERIALIZATION");
    assert!(!err.is_fatal());
    assert_eq!(store.state(), StoreState::Mutated);
}

/// Converters installed from a config file apply store-wide.
#[test]
fn test_config_installs_converters() {
    let dir = create_temp_dir();
    let config = StashConfig::from_json(
        &json!({
            "base_dir": dir.path().display().to_string(),
            "date_format": "%d.%m.%Y %H:%M:%S",
            "date_paths": ["at"],
            "trim_paths": ["name"],
            "pretty": true
        })
        .to_string(),
    )
    .unwrap();
    let registry = config.converters().unwrap();

    let store: CollectionStore<Event> = StoreBuilder::new("agenda", 0)
        .storage(Arc::new(config.storage()))
        .codec(config.codec_for(&registry, "agenda"))
        .options(config.options_for("agenda"))
        .collection()
        .unwrap();
    store.add(Event {
        name: "  standup ".into(),
        at: Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap(),
    });

    let text = fs::read_to_string(dir.path().join("storage.agenda.json")).unwrap();
    assert!(text.contains('\n'));
    let on_disk: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(on_disk["payload"][0]["at"], "02.01.2024 09:30:00");
    assert_eq!(on_disk["payload"][0]["name"], "standup");
}
