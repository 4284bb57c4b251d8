// tests/result_store.rs

use sumdag::errors::SumdagError;
use sumdag::store::ResultStore;

#[test]
fn second_write_is_rejected_and_first_value_kept() {
    let store = ResultStore::new();
    store.insert("A", "first".into()).unwrap();

    match store.insert("A", "second".into()) {
        Err(SumdagError::SummaryAlreadyRecorded(id)) => assert_eq!(id, "A"),
        other => panic!("Expected SummaryAlreadyRecorded, got: {other:?}"),
    }
    assert_eq!(store.get("A").unwrap(), Some("first".to_string()));
}

#[test]
fn clones_share_the_same_map() {
    let store = ResultStore::new();
    let handle = store.clone();

    store.insert("B", "b".into()).unwrap();
    store.insert("A", "a".into()).unwrap();

    assert!(handle.contains("A").unwrap());
    assert_eq!(handle.len().unwrap(), 2);
    assert_eq!(handle.ids().unwrap(), vec!["A".to_string(), "B".to_string()]);

    let snapshot = handle.snapshot().unwrap();
    store.insert("C", "c".into()).unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(handle.len().unwrap(), 3);
}

#[test]
fn missing_key_reads_as_none() {
    let store = ResultStore::new();
    assert!(store.is_empty().unwrap());
    assert_eq!(store.get("nope").unwrap(), None);
}
