use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::{
    mime, sanitize_filename, BlobConfig, BlobError, BlobId, BlobPut, BlobReceipt, BlobResult,
    BlobStore, MemoryBlobStore, OpenedBlob, RangeServer, StoredBlob, TransferProgress,
    TransferTracker, MAX_TTL,
};

/// Store and tracker handles, evicted together.
///
/// Scheduled self-deletion, the sweep and explicit eviction all go through
/// [`Pair::evict`].
#[derive(Clone)]
struct Pair {
    store: Arc<dyn BlobStore>,
    tracker: Arc<TransferTracker>,
}

impl Pair {
    fn evict(&self, id: &BlobId) -> bool {
        let removed = self.store.remove(id);
        self.tracker.evict(id);
        removed
    }
}

/// The main blob adapter: the one entry point services embed.
pub struct BlobAdapter {
    pair: Pair,
    ranges: RangeServer,
    config: BlobConfig,
}

impl BlobAdapter {
    /// Create a new blob adapter over any store
    pub fn new<S: BlobStore + 'static>(store: S, config: BlobConfig) -> Self {
        let store: Arc<dyn BlobStore> = Arc::new(store);
        let tracker = Arc::new(TransferTracker::new());
        Self {
            ranges: RangeServer::new(Arc::clone(&store), Arc::clone(&tracker)),
            pair: Pair { store, tracker },
            config,
        }
    }

    /// Create an adapter backed by [`MemoryBlobStore`]
    pub fn memory(config: BlobConfig) -> Self {
        Self::new(MemoryBlobStore::new(), config)
    }

    /// Store a blob and start its transfer stat.
    ///
    /// Oversized payloads are rejected before anything is stored. Inside a
    /// tokio runtime a one-shot deletion is scheduled at the TTL; without one,
    /// lazy eviction and the sweep still retire the blob.
    pub fn put(&self, put: BlobPut, payload: Bytes) -> BlobResult<BlobReceipt> {
        let size = payload.len() as u64;
        if size > self.config.max_blob_bytes {
            warn!(size, max = self.config.max_blob_bytes, "rejected oversized upload");
            return Err(BlobError::TooLarge {
                size,
                max: self.config.max_blob_bytes,
            });
        }

        let filename = sanitize_filename(
            put.filename.as_deref().unwrap_or_default(),
            self.config.max_filename_chars,
            &self.config.default_filename,
        );
        let content_type = mime::resolve(put.content_type.as_deref(), &filename);
        let ttl = put.ttl.unwrap_or(self.config.ttl).min(MAX_TTL);

        let blob = StoredBlob::new(BlobId::new(), payload, content_type, filename, Instant::now(), ttl);
        let receipt = BlobReceipt::from_blob(&blob);

        // Ids are not handed out before this returns; blob first, then stat,
        // so the sweep never sees a stat without its blob.
        self.pair.store.insert(blob);
        self.pair.tracker.init(&receipt.id, size);
        self.schedule_expiry(receipt.id.clone(), ttl);

        info!(
            blob_id = %receipt.id,
            size = receipt.size_bytes,
            content_type = %receipt.content_type,
            ttl_secs = ttl.as_secs(),
            "stored blob"
        );
        Ok(receipt)
    }

    /// Open a blob for reading, optionally limited to a `Range` header
    pub fn open(&self, id: &BlobId, range_header: Option<&str>) -> BlobResult<OpenedBlob> {
        self.ranges.serve(id, range_header)
    }

    /// Delivery progress for a blob still being tracked
    pub fn progress(&self, id: &BlobId) -> BlobResult<TransferProgress> {
        self.pair
            .tracker
            .progress(id, Instant::now())
            .ok_or_else(|| BlobError::not_found(id.as_str()))
    }

    /// Remove a blob and its stat; absent ids are a no-op
    pub fn evict(&self, id: &BlobId) -> bool {
        self.pair.evict(id)
    }

    /// Evict everything expired now; returns how many blobs went
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let expired = self.pair.store.sweep(now);
        for id in &expired {
            self.pair.tracker.evict(id);
            debug!(blob_id = %id, "swept expired blob");
        }

        let orphans: Vec<BlobId> = self
            .pair
            .tracker
            .ids()
            .into_iter()
            .filter(|id| !self.pair.store.contains(id))
            .collect();
        for id in &orphans {
            self.pair.tracker.evict(id);
        }
        if !orphans.is_empty() {
            debug!(orphans = orphans.len(), "dropped transfer stats without a blob");
        }

        expired.len()
    }

    fn schedule_expiry(&self, id: BlobId, ttl: Duration) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(blob_id = %id, "no runtime, skipping scheduled expiry");
            return;
        };

        let pair = self.pair.clone();
        handle.spawn(async move {
            tokio::time::sleep(ttl).await;
            if pair.evict(&id) {
                debug!(blob_id = %id, "scheduled expiry removed blob");
            }
        });
    }

    /// Get configuration
    pub fn config(&self) -> &BlobConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.pair.store
    }

    pub fn tracker(&self) -> &Arc<TransferTracker> {
        &self.pair.tracker
    }

    pub fn range_server(&self) -> &RangeServer {
        &self.ranges
    }
}
