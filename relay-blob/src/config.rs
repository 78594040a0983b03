use std::time::Duration;

/// Configuration for blob operations
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// Absolute max size allowed for a single blob
    pub max_blob_bytes: u64,

    /// Time-to-live applied when a put carries no override
    pub ttl: Duration,

    /// Longest display name kept after sanitizing, in characters
    pub max_filename_chars: usize,

    /// Display name used when sanitizing leaves nothing
    pub default_filename: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            max_blob_bytes: 5 * 1024 * 1024, // 5MB
            ttl: Duration::from_secs(10 * 60),
            max_filename_chars: 120,
            default_filename: "document".to_string(),
        }
    }
}

impl BlobConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max blob size
    pub fn with_max_blob_bytes(mut self, bytes: u64) -> Self {
        self.max_blob_bytes = bytes;
        self
    }

    /// Set default time-to-live
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_filename_chars(mut self, chars: usize) -> Self {
        self.max_filename_chars = chars;
        self
    }

    pub fn with_default_filename<S: Into<String>>(mut self, name: S) -> Self {
        self.default_filename = name.into();
        self
    }
}
