use evtrack::persistence::{FileStore, Store};
use serde_json::json;
use std::fs;

#[test]
fn file_store_set_get_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(tmp.path().join("nested")).unwrap();
    assert_eq!(store.dir(), tmp.path().join("nested"));

    store.set("ev_v2_session", &json!({"startSOC": 30, "kwhAdded": 0, "tsStart": 1})).unwrap();
    let reopened = FileStore::open(tmp.path().join("nested")).unwrap();
    let value = reopened.get("ev_v2_session").unwrap();
    assert_eq!(value["startSOC"], 30);
    assert!(tmp.path().join("nested/ev_v2_session.json").exists());
}

#[test]
fn file_store_missing_and_corrupt_read_as_absent() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileStore::open(tmp.path()).unwrap();
    assert!(store.get("nothing").is_none());

    fs::write(tmp.path().join("ev_v2_meta.json"), b"{\"car\": ").unwrap();
    assert!(store.get("ev_v2_meta").is_none());
}

#[test]
fn file_store_remove_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(tmp.path()).unwrap();
    store.set("k", &json!(1)).unwrap();
    store.remove("k").unwrap();
    assert!(store.get("k").is_none());
    store.remove("k").unwrap();
}

#[test]
fn file_store_overwrites_whole_record() {
    let tmp = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(tmp.path()).unwrap();
    store.set("k", &json!({"a": 1, "b": 2})).unwrap();
    store.set("k", &json!({"a": 3})).unwrap();
    assert_eq!(store.get("k"), Some(json!({"a": 3})));
    assert!(!tmp.path().join(".k.json.tmp").exists());
}
