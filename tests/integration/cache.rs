use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use assetweave::cache::{CacheKey, ContentCache, MemoryStorage};
use assetweave::core::{AssetError, ResourceType};
use assetweave::hash::Sha256Hash;
use assetweave::model::GroupKey;
use assetweave::injector::{InjectionTarget, Slot};
use assetweave::naming::HashEncoderNaming;
use futures::future::join_all;

fn cache() -> Arc<ContentCache> {
    Arc::new(ContentCache::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(Sha256Hash),
        assetweave::naming::default_strategy(),
    ))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_misses_compute_once() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = CacheKey::new(GroupKey::new("all", ResourceType::Js), "inputs");

    let tasks = (0..16).map(|_| {
        let cache = Arc::clone(&cache);
        let calls = Arc::clone(&calls);
        let key = key.clone();
        tokio::spawn(async move {
            cache
                .get_or_compute(key, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(b"var merged = true;".to_vec())
                })
                .await
        })
    });

    let entries: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(entries.iter().all(|entry| entry.content == b"var merged = true;"));
    assert!(entries.iter().all(|entry| Arc::ptr_eq(entry, &entries[0])));
    assert_eq!(cache.stats().misses, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_keys_do_not_wait_for_each_other() {
    let cache = cache();
    let js = CacheKey::new(GroupKey::new("all", ResourceType::Js), "h");
    let css = CacheKey::new(GroupKey::new("all", ResourceType::Css), "h");

    let slow = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .get_or_compute(js, || async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    Ok(b"slow".to_vec())
                })
                .await
        })
    };

    let fast = tokio::time::timeout(
        Duration::from_millis(250),
        cache.get_or_compute(css, || async { Ok(b"fast".to_vec()) }),
    )
    .await
    .expect("unrelated key blocked")
    .unwrap();
    assert_eq!(fast.content, b"fast");
    assert_eq!(slow.await.unwrap().unwrap().content, b"slow");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_retry_after_failure_stays_single_flight() {
    let cache = cache();
    let key = CacheKey::new(GroupKey::new("all", ResourceType::Js), "inputs");
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let computes = Arc::new(AtomicUsize::new(0));

    let caller = |delay: u64, fail: bool| {
        let cache = Arc::clone(&cache);
        let key = key.clone();
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        let computes = Arc::clone(&computes);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            cache
                .get_or_compute(key, || async move {
                    computes.fetch_add(1, Ordering::SeqCst);
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    if fail {
                        Err(AssetError::configuration("first attempt fails"))
                    } else {
                        Ok(b"var ok;".to_vec())
                    }
                })
                .await
        })
    };

    let first = caller(0, true);
    let waiting = caller(20, false);
    let late = caller(150, false);

    assert!(first.await.unwrap().is_err());
    assert_eq!(waiting.await.unwrap().unwrap().content, b"var ok;");
    assert_eq!(late.await.unwrap().unwrap().content, b"var ok;");
    assert_eq!(peak.load(Ordering::SeqCst), 1);
    assert_eq!(computes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_entry_named_by_naming_strategy() {
    let naming = HashEncoderNaming::default();
    for slot in naming.slots() {
        if let Slot::HashStrategy(hash) = slot {
            assert!(hash.set(Arc::new(Sha256Hash)));
        }
    }
    let cache = ContentCache::new(Arc::new(MemoryStorage::new()), Arc::new(Sha256Hash), Arc::new(naming));
    let key = CacheKey::new(GroupKey::new("all", ResourceType::Css), "h");
    let entry = cache.get_or_compute(key, || async { Ok(b"abc".to_vec()) }).await.unwrap();
    assert_eq!(
        entry.name,
        "all-ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad.css"
    );
}
