//! End-to-end coverage of the public facade over the in-process backend.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Duration, TimeZone, Utc};
use streamstore::prelude::*;
use streamstore::MemoryStore;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 3, 12, 0, 0).unwrap()
}

fn event(version: u64, metadata: &[(&str, &str)]) -> EventRecord {
    event_at(version, base_time() + Duration::seconds(version as i64), metadata)
}

fn event_at(version: u64, created_at: DateTime<Utc>, metadata: &[(&str, &str)]) -> EventRecord {
    let metadata: BTreeMap<String, String> = metadata
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EventRecord::new(
        uuid::Uuid::new_v4().to_string(),
        "order_noted",
        created_at,
        serde_json::json!({ "version": version }).to_string().into_bytes(),
        version,
        metadata,
    )
}

#[test]
fn create_load_round_trip_preserves_every_field() {
    let mut store = StreamStore::in_memory();
    let original = event(1, &[(AGGREGATE_ID_KEY, "a1"), ("tenant", "acme")]);
    store
        .create(&Stream::new("orders", vec![original.clone()]))
        .unwrap();

    let loaded = store.load("orders", None).unwrap();
    assert_eq!(loaded, vec![original]);
}

#[test]
fn create_with_zero_events_is_rejected_and_writes_nothing() {
    let mut store = StreamStore::in_memory();
    let err = store.create(&Stream::new("orders", Vec::new())).unwrap_err();
    assert_eq!(err.error_code(), "InvalidArgument");
    assert!(store.load("orders", None).unwrap().is_empty());
}

#[test]
fn load_returns_strictly_ascending_versions_from_min() {
    let mut store = StreamStore::in_memory();
    store
        .create(&Stream::new(
            "orders",
            vec![event(3, &[]), event(1, &[]), event(2, &[])],
        ))
        .unwrap();

    let all: Vec<u64> = store
        .load("orders", None)
        .unwrap()
        .iter()
        .map(|e| e.version)
        .collect();
    assert_eq!(all, vec![1, 2, 3]);

    let from_two: Vec<u64> = store
        .load("orders", Some(2))
        .unwrap()
        .iter()
        .map(|e| e.version)
        .collect();
    assert_eq!(from_two, vec![2, 3]);
}

#[test]
fn second_append_at_same_aggregate_version_is_a_concurrency_error() {
    let mut store = StreamStore::in_memory();
    store
        .append_to("orders", &[event(1, &[(AGGREGATE_ID_KEY, "a1")])])
        .unwrap();

    let err = store
        .append_to("orders", &[event(1, &[(AGGREGATE_ID_KEY, "a1")])])
        .unwrap_err();
    assert!(err.is_concurrency());
    assert!(err.is_retryable());
    assert_eq!(store.load("orders", None).unwrap().len(), 1);
}

#[test]
fn replay_since_keeps_equal_timestamps_and_orders_ascending() {
    let mut store = StreamStore::in_memory();
    let shared = base_time() + Duration::seconds(5);
    let second = event_at(2, shared, &[]);
    let third = event_at(3, shared, &[]);
    store
        .append_to(
            "orders",
            &[event_at(1, base_time(), &[]), second.clone(), third.clone()],
        )
        .unwrap();

    // Equal scores fall back to lexical order of the event ids.
    let mut expected = vec![second.event_id, third.event_id];
    expected.sort();

    let events = store.replay("orders", Some(shared), &BTreeMap::new()).unwrap();
    let ids: Vec<&str> = events.iter().map(|e| e.event_id.as_str()).collect();
    assert_eq!(ids, expected);
}

#[test]
fn metadata_shadowing_a_wire_field_is_rejected_and_stream_stays_loadable() {
    let mut store = StreamStore::in_memory();
    store.append_to("orders", &[event(1, &[])]).unwrap();

    let err = store
        .append_to("orders", &[event(2, &[("version", "oops")])])
        .unwrap_err();
    assert_eq!(err.error_code(), "InvalidArgument");

    let loaded = store.load("orders", None).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].version, 1);
}

#[test]
fn replay_metadata_filter_excludes_missing_key_and_wrong_value() {
    let mut store = StreamStore::in_memory();
    store
        .append_to(
            "orders",
            &[
                event(1, &[("tenant", "A"), ("extra", "x")]),
                event(2, &[("tenant", "B")]),
                event(3, &[("region", "eu")]),
            ],
        )
        .unwrap();

    let mut filter = BTreeMap::new();
    filter.insert("tenant".to_string(), "A".to_string());
    let events = store.replay("orders", None, &filter).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].version, 1);
}

#[test]
fn transaction_commit_makes_the_whole_batch_visible_at_once() {
    let mut store = StreamStore::in_memory();
    store.begin_transaction().unwrap();
    store
        .append_to("orders", &[event(1, &[]), event(2, &[]), event(3, &[])])
        .unwrap();
    assert!(store.in_transaction());
    assert!(store.load("orders", None).unwrap().is_empty());

    store.commit().unwrap();
    assert!(!store.in_transaction());
    assert_eq!(store.load("orders", None).unwrap().len(), 3);
}

#[test]
fn transaction_rollback_leaves_zero_new_events() {
    let mut store = StreamStore::in_memory();
    store.begin_transaction().unwrap();
    store
        .append_to("orders", &[event(1, &[]), event(2, &[]), event(3, &[])])
        .unwrap();
    store.rollback().unwrap();
    assert!(store.load("orders", None).unwrap().is_empty());
}

#[test]
fn transaction_lifecycle_misuse_is_invalid_state() {
    let mut store = StreamStore::in_memory();
    assert!(store.commit().unwrap_err().is_invalid_state());
    assert!(store.rollback().unwrap_err().is_invalid_state());

    store.begin_transaction().unwrap();
    assert!(store.begin_transaction().unwrap_err().is_invalid_state());
}

#[test]
fn conflicting_op_anywhere_in_the_batch_voids_the_whole_batch() {
    let mut store = StreamStore::in_memory();
    store
        .append_to("orders", &[event(1, &[(AGGREGATE_ID_KEY, "a1")])])
        .unwrap();

    store.begin_transaction().unwrap();
    store
        .append_to(
            "orders",
            &[
                event(2, &[(AGGREGATE_ID_KEY, "a1")]),
                event(1, &[(AGGREGATE_ID_KEY, "a1")]),
            ],
        )
        .unwrap();
    assert!(store.commit().unwrap_err().is_concurrency());
    assert_eq!(store.load("orders", None).unwrap().len(), 1);
}

#[test]
fn racing_writers_to_one_aggregate_version_admit_exactly_one() {
    let backend = Arc::new(MemoryStore::new());
    let mut handles = Vec::new();
    for _ in 0..4 {
        let backend = Arc::clone(&backend);
        handles.push(thread::spawn(move || {
            let mut store = StreamStore::with_backend(backend);
            store
                .append_to("orders", &[event(7, &[(AGGREGATE_ID_KEY, "a1")])])
                .is_ok()
        }));
    }

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(successes, 1, "exactly one racing writer may win the version");

    let store = StreamStore::with_backend(backend);
    assert_eq!(store.load("orders", None).unwrap().len(), 1);
}
