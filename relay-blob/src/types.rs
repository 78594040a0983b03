use std::time::{Duration, Instant};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobId(pub String);

impl BlobId {
    /// Generate a new random blob ID (UUID v4, 122 random bits)
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Create from existing string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BlobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BlobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BlobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Request to store a blob
#[derive(Debug, Clone, Default)]
pub struct BlobPut {
    pub content_type: Option<String>,
    pub filename: Option<String>,
    /// Overrides the configured TTL for this blob only
    pub ttl: Option<Duration>,
}

impl BlobPut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_filename<S: Into<String>>(mut self, filename: S) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// A blob held in memory until `expires_at`.
///
/// Everything is fixed at creation; the store hands out shared references
/// and never mutates an entry in place.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub id: BlobId,
    pub payload: Bytes,
    pub content_type: String,
    /// Sanitized display name, never used for addressing
    pub filename: String,
    pub size: u64,
    /// Monotonic deadline; all freshness checks use this
    pub expires_at: Instant,
    /// Wall-clock deadline reported to clients
    pub expires_at_utc: DateTime<Utc>,
}

/// Longest TTL honoured; larger values are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

impl StoredBlob {
    /// `ttl` is clamped to [`MAX_TTL`].
    pub fn new(
        id: BlobId,
        payload: Bytes,
        content_type: String,
        filename: String,
        now: Instant,
        ttl: Duration,
    ) -> Self {
        let ttl = ttl.min(MAX_TTL);
        let wall_ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at_utc = Utc::now()
            .checked_add_signed(wall_ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            id,
            size: payload.len() as u64,
            payload,
            content_type,
            filename,
            expires_at: now.checked_add(ttl).unwrap_or(now),
            expires_at_utc,
        }
    }

    /// A blob is expired from its deadline onwards.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Byte range for partial content requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>, // None means "to end of blob"
}

impl ByteRange {
    pub fn new(start: u64, end: Option<u64>) -> Self {
        Self { start, end }
    }

    pub fn from_start(start: u64) -> Self {
        Self { start, end: None }
    }

    /// Inclusive end offset against a blob of `total_size` bytes.
    ///
    /// `None` for an empty blob with an open-ended range.
    pub fn end_within(&self, total_size: u64) -> Option<u64> {
        match self.end {
            Some(end) => Some(end),
            None => total_size.checked_sub(1),
        }
    }

    pub fn is_valid(&self, total_size: u64) -> bool {
        match self.end_within(total_size) {
            Some(end) => self.start <= end && end < total_size,
            None => false,
        }
    }

    pub fn length(&self, total_size: u64) -> u64 {
        match self.end_within(total_size) {
            Some(end) if self.is_valid(total_size) => end - self.start + 1,
            _ => 0,
        }
    }
}
