use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::debug;

use crate::{BlobId, StoredBlob};

/// Core blob storage operations - implemented by every storage backend.
///
/// Each call is a single map operation; implementations hold their lock for
/// that call only and never across calls.
pub trait BlobStore: Send + Sync {
    /// Store a blob under its id
    fn insert(&self, blob: StoredBlob);

    /// Fetch a live blob.
    ///
    /// An entry found expired at `now` is removed by this same call and
    /// reported as missing.
    fn get(&self, id: &BlobId, now: Instant) -> Option<Arc<StoredBlob>>;

    /// Delete a blob; returns whether it was present
    fn remove(&self, id: &BlobId) -> bool;

    /// Whether an entry exists, expired or not
    fn contains(&self, id: &BlobId) -> bool;

    /// Remove every entry expired at `now` and return their ids
    fn sweep(&self, now: Instant) -> Vec<BlobId>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local backend: a `HashMap` behind a `parking_lot::RwLock`.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<BlobId, Arc<StoredBlob>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn insert(&self, blob: StoredBlob) {
        self.blobs.write().insert(blob.id.clone(), Arc::new(blob));
    }

    fn get(&self, id: &BlobId, now: Instant) -> Option<Arc<StoredBlob>> {
        {
            let blobs = self.blobs.read();
            match blobs.get(id) {
                None => return None,
                Some(blob) if !blob.is_expired_at(now) => return Some(Arc::clone(blob)),
                Some(_) => {}
            }
        }

        // Expired: an expired entry can never become live again, so re-checking
        // under the write lock is enough to keep the eviction race-free.
        let mut blobs = self.blobs.write();
        if blobs.get(id).is_some_and(|blob| blob.is_expired_at(now)) {
            blobs.remove(id);
            debug!(blob_id = %id, "evicted expired blob on read");
        }
        None
    }

    fn remove(&self, id: &BlobId) -> bool {
        self.blobs.write().remove(id).is_some()
    }

    fn contains(&self, id: &BlobId) -> bool {
        self.blobs.read().contains_key(id)
    }

    fn sweep(&self, now: Instant) -> Vec<BlobId> {
        let mut blobs = self.blobs.write();
        let expired: Vec<BlobId> = blobs
            .iter()
            .filter(|(_, blob)| blob.is_expired_at(now))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            blobs.remove(id);
        }
        expired
    }

    fn len(&self) -> usize {
        self.blobs.read().len()
    }
}
