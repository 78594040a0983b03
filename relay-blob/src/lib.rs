//! # relay-blob: ephemeral in-memory blob storage
//!
//! `relay-blob` holds uploaded documents in memory for a bounded time-to-live
//! and serves them back with byte-range support, counting every byte that
//! leaves so callers can report delivery progress.
//!
//! ## Key Features
//!
//! - **TTL-bound**: every blob carries an absolute expiry; expired blobs are
//!   never returned, whether or not a sweep has run yet
//! - **Redundant expiry**: a per-blob scheduled deletion plus a periodic sweep,
//!   both idempotent
//! - **Range reads**: single `bytes=start-end` ranges sliced zero-copy out of
//!   the stored buffer
//! - **Progress accounting**: atomic per-blob byte counters with elapsed time
//!   and ETA
//! - **Server agnostic**: no HTTP coupling; the axum crate maps results onto
//!   responses
//!
//! ## Quick Start
//!
//! ```rust
//! use relay_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let adapter = BlobAdapter::memory(BlobConfig::default());
//!
//! let put = BlobPut::new()
//!     .with_content_type("text/plain")
//!     .with_filename("hello.txt");
//! let receipt = adapter.put(put, bytes::Bytes::from_static(b"Hello, world!"))?;
//!
//! let opened = adapter.open(&receipt.id, Some("bytes=0-4"))?;
//! assert_eq!(&opened.body[..], b"Hello");
//!
//! let progress = adapter.progress(&receipt.id)?;
//! assert_eq!(progress.bytes_sent, 5);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────┐
//! │        BlobAdapter          │  ← paired create / paired evict
//! ├──────────────┬──────────────┤
//! │  RangeServer │ ExpiryReaper │  ← read path / periodic sweep
//! ├──────────────┼──────────────┤
//! │  BlobStore   │TransferTracker│ ← two independent lock-guarded maps
//! └──────────────┴──────────────┘
//! ```

pub mod adapter;
mod config;
mod error;
pub mod mime;
pub mod range;
pub mod reaper;
mod receipt;
pub mod sanitize;
pub mod store;
pub mod tracker;
mod types;

pub use adapter::BlobAdapter;
pub use config::BlobConfig;
pub use error::{BlobError, BlobResult};
pub use range::{parse_range_header, RangeServer};
pub use reaper::ExpiryReaper;
pub use receipt::{BlobReceipt, OpenedBlob, ResolvedRange};
pub use sanitize::sanitize_filename;
pub use store::{BlobStore, MemoryBlobStore};
pub use tracker::{TransferProgress, TransferTracker};
pub use types::{BlobId, BlobPut, ByteRange, StoredBlob, MAX_TTL};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobAdapter, BlobConfig, BlobError, BlobId, BlobPut, BlobReceipt, BlobResult,
        BlobStore, OpenedBlob, TransferProgress,
    };
}
