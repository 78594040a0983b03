//! Range Server: turns `(id, Range header)` into an [`OpenedBlob`] and
//! records the delivered byte count.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::{
    BlobError, BlobId, BlobResult, BlobStore, ByteRange, OpenedBlob, ResolvedRange,
    TransferTracker,
};

/// Parse a single `bytes=<start>-<end?>` range.
///
/// Anything else (suffix ranges, multiple ranges, other units, non-digits,
/// overflowing offsets) yields `None`, which callers treat as "no usable
/// range" rather than as an error.
pub fn parse_range_header(header: &str) -> Option<ByteRange> {
    let ranges = header.trim().strip_prefix("bytes=")?;
    let (start, end) = ranges.split_once('-')?;

    let start = parse_offset(start.trim())?;
    let end = match end.trim() {
        "" => None,
        end => Some(parse_offset(end)?),
    };
    Some(ByteRange::new(start, end))
}

fn parse_offset(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Serves reads against the store while driving the tracker.
///
/// Holds explicit handles to both services; it owns neither.
#[derive(Clone)]
pub struct RangeServer {
    store: Arc<dyn BlobStore>,
    tracker: Arc<TransferTracker>,
}

impl RangeServer {
    pub fn new(store: Arc<dyn BlobStore>, tracker: Arc<TransferTracker>) -> Self {
        Self { store, tracker }
    }

    pub fn serve(&self, id: &BlobId, range_header: Option<&str>) -> BlobResult<OpenedBlob> {
        self.serve_at(id, range_header, Instant::now())
    }

    pub fn serve_at(
        &self,
        id: &BlobId,
        range_header: Option<&str>,
        now: Instant,
    ) -> BlobResult<OpenedBlob> {
        let Some(blob) = self.store.get(id, now) else {
            self.tracker.evict(id);
            return Err(BlobError::not_found(id.as_str()));
        };

        let opened = match range_header.and_then(parse_range_header) {
            None => {
                if let Some(raw) = range_header {
                    debug!(blob_id = %id, range = raw, "unusable range header, serving full body");
                }
                OpenedBlob::full(blob)
            }
            Some(range) => {
                let size = blob.size;
                let resolved = ResolvedRange::from_request(&range, size)
                    .ok_or(BlobError::RangeNotSatisfiable { size })?;
                debug!(blob_id = %id, start = resolved.start, end = resolved.end, "serving range");
                OpenedBlob::partial(blob, resolved)
            }
        };

        if self.tracker.record_delivery(id, opened.content_length(), now) {
            info!(blob_id = %id, size = opened.total_size(), "transfer complete");
        }
        Ok(opened)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryBlobStore, StoredBlob};
    use bytes::Bytes;
    use std::time::Duration;

    fn server_with(payload: &'static [u8]) -> (RangeServer, BlobId, Arc<TransferTracker>) {
        let store = Arc::new(MemoryBlobStore::new());
        let tracker = Arc::new(TransferTracker::new());
        let blob = StoredBlob::new(
            BlobId::new(),
            Bytes::from_static(payload),
            "application/octet-stream".into(),
            "file.bin".into(),
            Instant::now(),
            Duration::from_secs(60),
        );
        let id = blob.id.clone();
        tracker.init(&id, blob.size);
        store.insert(blob);
        (RangeServer::new(store, Arc::clone(&tracker)), id, tracker)
    }

    #[test]
    fn parses_closed_and_open_ranges() {
        assert_eq!(parse_range_header("bytes=10-19"), Some(ByteRange::new(10, Some(19))));
        assert_eq!(parse_range_header("bytes=0-"), Some(ByteRange::from_start(0)));
        assert_eq!(parse_range_header("  bytes=5-2 "), Some(ByteRange::new(5, Some(2))));
    }

    #[test]
    fn rejects_unsupported_grammar() {
        for header in [
            "",
            "bytes=",
            "bytes=-500",
            "bytes=0-1,5-6",
            "items=0-1",
            "bytes=a-b",
            "bytes=+1-2",
            "bytes=99999999999999999999999-",
        ] {
            assert_eq!(parse_range_header(header), None, "{header}");
        }
    }

    #[test]
    fn no_header_serves_full_body() {
        let (server, id, tracker) = server_with(b"0123456789");
        let opened = server.serve(&id, None).unwrap();
        assert!(!opened.is_partial());
        assert_eq!(opened.body, Bytes::from_static(b"0123456789"));
        assert_eq!(tracker.stat(&id).unwrap().bytes_sent(), 10);
    }

    #[test]
    fn malformed_header_falls_back_to_full_body() {
        let (server, id, _) = server_with(b"0123456789");
        let opened = server.serve(&id, Some("bytes=oops")).unwrap();
        assert!(!opened.is_partial());
        assert_eq!(opened.content_length(), 10);
    }

    #[test]
    fn open_range_covers_whole_blob() {
        let (server, id, _) = server_with(b"0123456789");
        let opened = server.serve(&id, Some("bytes=0-")).unwrap();
        let range = opened.range.clone().unwrap();
        assert_eq!(range.content_range(), "bytes 0-9/10");
        assert!(range.is_full_content());
        assert_eq!(opened.content_length(), 10);
    }

    #[test]
    fn unsatisfiable_range_leaves_tracker_untouched() {
        let (server, id, tracker) = server_with(b"0123456789");
        assert_eq!(
            server.serve(&id, Some("bytes=5-2")).unwrap_err(),
            BlobError::RangeNotSatisfiable { size: 10 }
        );
        assert_eq!(
            server.serve(&id, Some("bytes=0-10")).unwrap_err(),
            BlobError::RangeNotSatisfiable { size: 10 }
        );
        let stat = tracker.stat(&id).unwrap();
        assert_eq!(stat.bytes_sent(), 0);
        assert_eq!(stat.started_at(), None);
    }

    #[test]
    fn miss_evicts_lingering_stat() {
        let (server, _, tracker) = server_with(b"x");
        let ghost = BlobId::new();
        tracker.init(&ghost, 5);

        assert!(matches!(server.serve(&ghost, None), Err(BlobError::NotFound { .. })));
        assert!(tracker.stat(&ghost).is_none());
    }
}
