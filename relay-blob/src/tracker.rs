//! Per-blob delivery accounting.
//!
//! The tracker is independent of the store: it only shares blob ids. Counters
//! live behind an `Arc` so a delivery is recorded with a short read lock on
//! the map followed by lock-free atomics on the stat itself.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use parking_lot::RwLock;
use serde::Serialize;

use crate::BlobId;

#[derive(Debug)]
pub struct TransferStat {
    size: u64,
    bytes_sent: AtomicU64,
    started_at: OnceLock<Instant>,
    completed_at: OnceLock<Instant>,
}

impl TransferStat {
    fn new(size: u64) -> Self {
        Self {
            size,
            bytes_sent: AtomicU64::new(0),
            started_at: OnceLock::new(),
            completed_at: OnceLock::new(),
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Acquire)
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at.get().copied()
    }

    pub fn completed_at(&self) -> Option<Instant> {
        self.completed_at.get().copied()
    }
}

/// Body of `GET /progress/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferProgress {
    pub size: u64,
    pub bytes_sent: u64,
    /// `None` until a delivery rate can be computed
    pub eta_sec: Option<u64>,
    /// Seconds since the first delivery
    pub elapsed: f64,
}

#[derive(Default)]
pub struct TransferTracker {
    stats: RwLock<HashMap<BlobId, Arc<TransferStat>>>,
}

impl TransferTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a zeroed stat; replaces any previous one for the id.
    pub fn init(&self, id: &BlobId, size: u64) {
        self.stats
            .write()
            .insert(id.clone(), Arc::new(TransferStat::new(size)));
    }

    /// Add `bytes` delivered for `id` at `now`.
    ///
    /// Returns true for the one call whose delivery completed the transfer.
    /// Unknown ids are ignored.
    pub fn record_delivery(&self, id: &BlobId, bytes: u64, now: Instant) -> bool {
        let Some(stat) = self.stat(id) else {
            return false;
        };

        stat.started_at.get_or_init(|| now);
        let total = stat
            .bytes_sent
            .fetch_add(bytes, Ordering::AcqRel)
            .saturating_add(bytes);

        total >= stat.size && stat.completed_at.set(now).is_ok()
    }

    pub fn progress(&self, id: &BlobId, now: Instant) -> Option<TransferProgress> {
        let stat = self.stat(id)?;
        let bytes_sent = stat.bytes_sent();

        let elapsed = stat
            .started_at()
            .map(|started| now.saturating_duration_since(started).as_secs_f64())
            .unwrap_or(0.0);

        let remaining = stat.size.saturating_sub(bytes_sent);
        let rate = if elapsed > 0.0 {
            bytes_sent as f64 / elapsed
        } else {
            0.0
        };
        let eta_sec = (rate > 0.0).then(|| (remaining as f64 / rate).ceil() as u64);

        Some(TransferProgress {
            size: stat.size,
            bytes_sent,
            eta_sec,
            elapsed,
        })
    }

    pub fn stat(&self, id: &BlobId) -> Option<Arc<TransferStat>> {
        self.stats.read().get(id).cloned()
    }

    /// Remove the stat; absent ids are a no-op.
    pub fn evict(&self, id: &BlobId) -> bool {
        self.stats.write().remove(id).is_some()
    }

    /// Snapshot of tracked ids.
    pub fn ids(&self) -> Vec<BlobId> {
        self.stats.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.stats.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
