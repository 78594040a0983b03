use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use relay_blob::{
    BlobAdapter, BlobConfig, BlobError, BlobId, BlobPut, BlobStore, MemoryBlobStore, RangeServer,
    StoredBlob, TransferTracker,
};

/// Test factory functions
fn patterned_payload(len: usize) -> Bytes {
    Bytes::from((0..len).map(|i| (i % 251) as u8).collect::<Vec<u8>>())
}

fn stored_blob(payload: Bytes, now: Instant, ttl: Duration) -> StoredBlob {
    StoredBlob::new(
        BlobId::new(),
        payload,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document".to_string(),
        "memo.docx".to_string(),
        now,
        ttl,
    )
}

fn range_fixture(payload: Bytes) -> (RangeServer, Arc<TransferTracker>, BlobId) {
    let store = Arc::new(MemoryBlobStore::new());
    let tracker = Arc::new(TransferTracker::new());
    let blob = stored_blob(payload, Instant::now(), Duration::from_secs(600));
    let id = blob.id.clone();
    tracker.init(&id, blob.size);
    store.insert(blob);
    (RangeServer::new(store, Arc::clone(&tracker)), tracker, id)
}

/// A1. Put then get returns identical payload, size and type
#[test]
fn test_get_after_put_is_identical() {
    let adapter = BlobAdapter::memory(BlobConfig::default());
    let payload = patterned_payload(4096);

    let receipt = adapter
        .put(
            BlobPut::new()
                .with_filename("Quarterly Plan.pptx")
                .with_content_type("application/vnd.ms-powerpoint"),
            payload.clone(),
        )
        .unwrap();

    let blob = adapter.store().get(&receipt.id, Instant::now()).unwrap();
    assert_eq!(blob.payload, payload);
    assert_eq!(blob.size, 4096);
    assert_eq!(blob.content_type, "application/vnd.ms-powerpoint");
    assert_eq!(blob.filename, "Quarterly_Plan.pptx");
}

/// A2. Oversized uploads leave the store unchanged
#[test]
fn test_oversized_put_leaves_store_unchanged() {
    let adapter = BlobAdapter::memory(BlobConfig::default().with_max_blob_bytes(100));
    adapter.put(BlobPut::new(), patterned_payload(10)).unwrap();

    let err = adapter.put(BlobPut::new(), patterned_payload(101)).unwrap_err();
    assert!(matches!(err, BlobError::TooLarge { size: 101, max: 100 }));
    assert_eq!(adapter.store().len(), 1);
    assert_eq!(adapter.tracker().len(), 1);
}

/// A3. TTL boundary: live strictly before t, missing at and after t
#[test]
fn test_ttl_boundary_is_exact() {
    let store = MemoryBlobStore::new();
    let t0 = Instant::now();
    let ttl = Duration::from_secs(60);

    let blob = stored_blob(patterned_payload(8), t0, ttl);
    let id = blob.id.clone();
    store.insert(blob);

    assert!(store.get(&id, t0).is_some());
    assert!(store.get(&id, t0 + ttl - Duration::from_nanos(1)).is_some());
    assert!(store.get(&id, t0 + ttl).is_none());
    // Evicted by the miss above, so it stays gone even for earlier instants.
    assert!(store.get(&id, t0).is_none());
}

/// A4. Evicting an absent id is a no-op
#[test]
fn test_evicting_absent_id_is_noop() {
    let adapter = BlobAdapter::memory(BlobConfig::default());
    let keep = adapter.put(BlobPut::new(), patterned_payload(3)).unwrap();

    assert!(!adapter.evict(&BlobId::new()));
    assert!(!adapter.store().remove(&BlobId::new()));
    assert!(!adapter.tracker().evict(&BlobId::new()));
    assert!(adapter.store().contains(&keep.id));
}

/// B1. Open range yields the whole body with a full Content-Range
#[test]
fn test_open_range_declares_full_extent() {
    let payload = patterned_payload(1000);
    let (server, _, id) = range_fixture(payload.clone());

    let opened = server.serve(&id, Some("bytes=0-")).unwrap();
    assert_eq!(opened.body, payload);
    assert_eq!(opened.range.unwrap().content_range(), "bytes 0-999/1000");
}

/// B2. Closed range yields exactly the requested bytes
#[test]
fn test_closed_range_slices_exact_bytes() {
    let payload = patterned_payload(64);
    let (server, tracker, id) = range_fixture(payload.clone());

    let opened = server.serve(&id, Some("bytes=10-19")).unwrap();
    assert_eq!(opened.content_length(), 10);
    assert_eq!(opened.body, payload.slice(10..=19));
    assert_eq!(opened.range.unwrap().content_range(), "bytes 10-19/64");
    assert_eq!(tracker.stat(&id).unwrap().bytes_sent(), 10);
}

/// B3. Inverted and out-of-bounds ranges are rejected
#[test]
fn test_unsatisfiable_ranges_are_rejected() {
    let n = 50u64;
    let (server, tracker, id) = range_fixture(patterned_payload(n as usize));

    for header in ["bytes=5-2".to_string(), format!("bytes=0-{n}"), format!("bytes={n}-")] {
        let err = server.serve(&id, Some(&header)).unwrap_err();
        assert_eq!(err, BlobError::RangeNotSatisfiable { size: n }, "{header}");
    }
    assert_eq!(tracker.stat(&id).unwrap().bytes_sent(), 0);
}

/// C1. Concurrent deliveries against one id lose no updates
#[test]
fn test_concurrent_deliveries_sum_exactly() {
    let payload = patterned_payload(10_000);
    let (server, tracker, id) = range_fixture(payload);

    let headers: Vec<String> = (0..16)
        .map(|i| format!("bytes={}-{}", i * 100, i * 100 + i))
        .collect();
    let expected: u64 = (0..16u64).map(|i| i + 1).sum::<u64>() * 25;

    std::thread::scope(|scope| {
        for _ in 0..25 {
            let server = server.clone();
            let id = id.clone();
            let headers = headers.clone();
            scope.spawn(move || {
                for header in &headers {
                    server.serve(&id, Some(header)).unwrap();
                }
            });
        }
    });

    assert_eq!(tracker.stat(&id).unwrap().bytes_sent(), expected);
}

/// C2. Concurrent puts and reads across ids stay independent
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_uploads_and_reads() {
    let adapter = Arc::new(BlobAdapter::memory(BlobConfig::default()));

    let mut tasks = Vec::new();
    for i in 0..32usize {
        let adapter = Arc::clone(&adapter);
        tasks.push(tokio::spawn(async move {
            let payload = patterned_payload(100 + i);
            let receipt = adapter.put(BlobPut::new(), payload.clone()).unwrap();
            let opened = adapter.open(&receipt.id, None).unwrap();
            assert_eq!(opened.body, payload);
            adapter.progress(&receipt.id).unwrap().bytes_sent
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        assert_eq!(task.await.unwrap(), (100 + i) as u64);
    }
    assert_eq!(adapter.store().len(), 32);
}

/// D1. A response resolved before expiry is not affected by it
#[test]
fn test_in_flight_body_survives_expiry() {
    let adapter = BlobAdapter::memory(BlobConfig::default());
    let payload = patterned_payload(256);
    let receipt = adapter
        .put(BlobPut::new().with_ttl(Duration::from_secs(60)), payload.clone())
        .unwrap();

    let opened = adapter.open(&receipt.id, Some("bytes=0-127")).unwrap();
    assert!(adapter.evict(&receipt.id));

    assert_eq!(opened.body, payload.slice(0..128));
    assert!(matches!(
        adapter.open(&receipt.id, None),
        Err(BlobError::NotFound { .. })
    ));
}

/// D2. A read that finds the blob expired also drops its stat
#[test]
fn test_expired_read_drops_stat() {
    let adapter = BlobAdapter::memory(BlobConfig::default());
    let receipt = adapter
        .put(BlobPut::new().with_ttl(Duration::from_secs(1)), patterned_payload(16))
        .unwrap();

    let later = Instant::now() + Duration::from_secs(2);
    assert!(matches!(
        adapter.range_server().serve_at(&receipt.id, None, later),
        Err(BlobError::NotFound { .. })
    ));
    assert!(adapter.tracker().stat(&receipt.id).is_none());
    assert!(matches!(
        adapter.progress(&receipt.id),
        Err(BlobError::NotFound { .. })
    ));
}
