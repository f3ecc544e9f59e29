//! Integration Tests for the instrumented store and the expiring cache
//!
//! Exercises the public API end to end over a shared memory store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kv_tracker::backend::ManualClock;
use kv_tracker::fetch::CacheResult;
use kv_tracker::instrument::CallRecord;
use kv_tracker::{
    fetch_fn, CacheError, ExpiringCache, Fetch, InstrumentedStore, KeyValueStore, MemoryStore,
};
use serde_json::json;

// == Helper Functions ==

fn shared_store() -> (Arc<MemoryStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let store = Arc::new(MemoryStore::with_clock(1000, clock.clone()));
    (store, clock)
}

// == Instrumented Store Tests ==

#[test]
fn test_store_and_get_roundtrip() {
    let (store, _) = shared_store();
    let cache = InstrumentedStore::new(store);

    let text = cache.store("foo").unwrap();
    let bytes = cache.store(b"bar".to_vec()).unwrap();
    let int = cache.store(123).unwrap();
    let float = cache.store(0.25).unwrap();

    assert_eq!(cache.get(&text).unwrap(), Some(b"foo".to_vec()));
    assert_eq!(cache.get(&bytes).unwrap(), Some(b"bar".to_vec()));
    assert_eq!(cache.get(&int).unwrap(), Some(b"123".to_vec()));
    assert_eq!(cache.get(&float).unwrap(), Some(b"0.25".to_vec()));

    assert_eq!(cache.get_str(&text).unwrap(), Some("foo".to_string()));
    assert_eq!(cache.get_int(&int).unwrap(), Some(123));
}

#[test]
fn test_get_never_written_key_is_none() {
    let (store, _) = shared_store();
    let cache = InstrumentedStore::new(store);

    assert_eq!(cache.get("no-such-key").unwrap(), None);
    assert_eq!(cache.get_str("no-such-key").unwrap(), None);
    assert_eq!(cache.get_int("no-such-key").unwrap(), None);
}

#[test]
fn test_typed_getters_on_raw_bytes() {
    let (store, _) = shared_store();
    store.set("hello", b"hello").unwrap();
    store.set("answer", b"42").unwrap();
    store.set("binary", &[0xc3, 0x28]).unwrap();

    let cache = InstrumentedStore::new(store);

    assert_eq!(cache.get_str("hello").unwrap(), Some("hello".to_string()));
    assert_eq!(cache.get_int("answer").unwrap(), Some(42));
    assert!(matches!(cache.get_str("binary"), Err(CacheError::Decode(_))));
    assert!(matches!(cache.get_int("hello"), Err(CacheError::Decode(_))));
}

#[test]
fn test_call_count_and_history_after_n_calls() {
    let (store, _) = shared_store();
    let cache = InstrumentedStore::new(store.clone());

    let keys: Vec<String> = ["first", "second", "third"]
        .into_iter()
        .map(|value| cache.store(value).unwrap())
        .collect();

    assert_eq!(cache.call_count().unwrap(), 3);
    assert_eq!(store.get("Cache.store").unwrap(), Some(b"3".to_vec()));
    assert_eq!(store.lrange("Cache.store:inputs", 0, -1).unwrap().len(), 3);
    assert_eq!(store.lrange("Cache.store:outputs", 0, -1).unwrap().len(), 3);

    assert_eq!(
        cache.history().unwrap(),
        vec![
            CallRecord {
                input: json!("first"),
                output: json!(keys[0]),
            },
            CallRecord {
                input: json!("second"),
                output: json!(keys[1]),
            },
            CallRecord {
                input: json!("third"),
                output: json!(keys[2]),
            },
        ]
    );
}

#[test]
fn test_replay_output() {
    let (store, _) = shared_store();
    let cache = InstrumentedStore::with_operation(store, "Notes.store");

    let a = cache.store("a").unwrap();
    let b = cache.store(7).unwrap();

    let mut out = Vec::new();
    cache.replay(&mut out).unwrap();

    let expected = format!(
        "Notes.store was called 2 times:\n\
         Notes.store(\"a\") -> \"{}\"\n\
         Notes.store(7) -> \"{}\"\n",
        a, b
    );
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn test_replay_never_called() {
    let (store, _) = shared_store();
    let cache = InstrumentedStore::new(store);

    let mut out = Vec::new();
    cache.replay(&mut out).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "Cache.store was called 0 times:\n");
}

// == Expiring Cache Tests ==

#[test]
fn test_second_access_within_window_is_served_from_cache() {
    let (store, _) = shared_store();
    let fetches = AtomicUsize::new(0);
    let cache = ExpiringCache::with_expiration(
        store.clone(),
        fetch_fn(|url: &str| {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok(format!("<html>{}</html>", url))
        }),
        Duration::from_secs(10),
    )
    .unwrap();

    assert_eq!(cache.access("u").unwrap(), "<html>u</html>");
    assert_eq!(cache.access("u").unwrap(), "<html>u</html>");

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(cache.access_count("u").unwrap(), 2);
    assert_eq!(store.get("count:u").unwrap(), Some(b"2".to_vec()));
    assert_eq!(store.ttl("cached:u").unwrap(), Some(Duration::from_secs(10)));
}

#[test]
fn test_access_after_expiry_fetches_again() {
    let (store, clock) = shared_store();
    let fetches = AtomicUsize::new(0);
    let cache = ExpiringCache::with_expiration(
        store,
        fetch_fn(|_: &str| {
            let n = fetches.fetch_add(1, Ordering::SeqCst);
            Ok(format!("version {}", n))
        }),
        Duration::from_secs(10),
    )
    .unwrap();

    assert_eq!(cache.access("u").unwrap(), "version 0");
    clock.advance(Duration::from_secs(5));
    assert_eq!(cache.access("u").unwrap(), "version 0");

    clock.advance(Duration::from_secs(5));
    assert!(!cache.is_cached("u").unwrap());
    assert_eq!(cache.access("u").unwrap(), "version 1");

    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert_eq!(cache.access_count("u").unwrap(), 3);
}

#[test]
fn test_failed_fetch_is_not_cached_and_is_retried() {
    let (store, _) = shared_store();
    let attempts = AtomicUsize::new(0);
    let cache = ExpiringCache::new(
        store.clone(),
        fetch_fn(|_: &str| {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("connection reset");
            }
            Ok("recovered".to_string())
        }),
    );

    match cache.access("u") {
        Err(CacheError::Fetch { argument, source }) => {
            assert_eq!(argument, "u");
            assert_eq!(source.to_string(), "connection reset");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(store.get("cached:u").unwrap(), None);
    assert_eq!(cache.access_count("u").unwrap(), 1);

    assert_eq!(cache.access("u").unwrap(), "recovered");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(cache.access_count("u").unwrap(), 2);
}

#[test]
fn test_arguments_are_cached_independently() {
    let (store, _) = shared_store();
    let cache = ExpiringCache::new(store, fetch_fn(|url: &str| Ok(url.len().to_string())));

    assert_eq!(cache.access("a").unwrap(), "1");
    assert_eq!(cache.access("bbb").unwrap(), "3");

    assert_eq!(cache.access_count("a").unwrap(), 1);
    assert_eq!(cache.access_count("bbb").unwrap(), 1);
}

#[test]
fn test_long_url_is_cached() {
    let (store, _) = shared_store();
    let fetches = AtomicUsize::new(0);
    let cache = ExpiringCache::new(
        store.clone(),
        fetch_fn(|_: &str| {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok("body".to_string())
        }),
    );
    let url = format!("http://example.com/?q={}", "x".repeat(2048));

    assert_eq!(cache.access(&url).unwrap(), "body");
    assert_eq!(cache.access(&url).unwrap(), "body");

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(cache.access_count(&url).unwrap(), 2);
    assert!(cache.is_cached(&url).unwrap());
}

#[test]
fn test_expiration_under_one_millisecond_is_rejected() {
    let (store, _) = shared_store();

    for expiration in [Duration::ZERO, Duration::from_nanos(1)] {
        let result = ExpiringCache::with_expiration(
            store.clone(),
            fetch_fn(|_: &str| Ok("body".to_string())),
            expiration,
        );
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    let cache = ExpiringCache::with_expiration(
        store,
        fetch_fn(|_: &str| Ok("body".to_string())),
        Duration::from_millis(1),
    )
    .unwrap();
    assert_eq!(cache.access("u").unwrap(), "body");
    assert!(cache.is_cached("u").unwrap());
}

#[test]
fn test_decorators_compose_by_hand() {
    let (store, _) = shared_store();
    let fetches = AtomicUsize::new(0);
    let page = fetch_fn(|_: &str| {
        fetches.fetch_add(1, Ordering::SeqCst);
        Ok("body".to_string())
    });

    // Caching without access counting
    let cached = CacheResult::new(store.clone(), page);
    cached.fetch("u").unwrap();
    cached.fetch("u").unwrap();

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(store.get("count:u").unwrap(), None);
}

#[test]
fn test_store_and_cache_share_a_backend() {
    let (store, _) = shared_store();
    let values = InstrumentedStore::new(store.clone());
    let pages = ExpiringCache::new(store.clone(), fetch_fn(|_: &str| Ok("page".to_string())));

    values.store("v").unwrap();
    pages.access("u").unwrap();

    assert_eq!(values.call_count().unwrap(), 1);
    assert_eq!(pages.access_count("u").unwrap(), 1);

    store.flush_all().unwrap();

    assert_eq!(values.call_count().unwrap(), 0);
    assert_eq!(pages.access_count("u").unwrap(), 0);
    assert!(!pages.is_cached("u").unwrap());
}
