use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BlobId, ByteRange, StoredBlob};

/// Receipt returned after successfully storing a blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobReceipt {
    pub id: BlobId,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub expires_at: DateTime<Utc>,
}

impl BlobReceipt {
    pub fn from_blob(blob: &StoredBlob) -> Self {
        Self {
            id: blob.id.clone(),
            filename: blob.filename.clone(),
            content_type: blob.content_type.clone(),
            size_bytes: blob.size,
            expires_at: blob.expires_at_utc,
        }
    }
}

/// Range information for partial content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRange {
    pub start: u64,
    pub end: u64,
    pub total_size: u64,
}

impl ResolvedRange {
    /// `None` unless `0 <= start <= end < total_size`.
    pub fn from_request(range: &ByteRange, total_size: u64) -> Option<Self> {
        if !range.is_valid(total_size) {
            return None;
        }
        let end = range.end_within(total_size)?;
        Some(Self {
            start: range.start,
            end,
            total_size,
        })
    }

    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_full_content(&self) -> bool {
        self.start == 0 && self.end + 1 == self.total_size
    }

    /// `Content-Range` header value, e.g. `bytes 0-99/1000`
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }
}

/// Result of opening a blob for reading.
///
/// `body` is already sliced out of the stored payload, so the response stays
/// intact even if the blob expires while it is being written.
#[derive(Debug, Clone)]
pub struct OpenedBlob {
    pub blob: Arc<StoredBlob>,
    pub body: Bytes,
    /// Set for partial (range) responses only
    pub range: Option<ResolvedRange>,
}

impl OpenedBlob {
    pub fn full(blob: Arc<StoredBlob>) -> Self {
        Self {
            body: blob.payload.clone(),
            blob,
            range: None,
        }
    }

    pub fn partial(blob: Arc<StoredBlob>, range: ResolvedRange) -> Self {
        let start = range.start as usize;
        let end = range.end as usize;
        Self {
            body: blob.payload.slice(start..=end),
            blob,
            range: Some(range),
        }
    }

    /// Check if this is a range response (even one spanning the whole blob)
    pub fn is_partial(&self) -> bool {
        self.range.is_some()
    }

    pub fn content_length(&self) -> u64 {
        self.body.len() as u64
    }

    pub fn content_type(&self) -> &str {
        &self.blob.content_type
    }

    pub fn filename(&self) -> &str {
        &self.blob.filename
    }

    pub fn total_size(&self) -> u64 {
        self.blob.size
    }
}
