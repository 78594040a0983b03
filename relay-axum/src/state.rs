use std::sync::Arc;

use relay_blob::{BlobAdapter, BlobConfig};
use relay_core::RelayConfig;

/// Shared handler state: the blob adapter plus the settings it was built from.
#[derive(Clone)]
pub struct RelayState {
    pub adapter: Arc<BlobAdapter>,
    pub config: Arc<RelayConfig>,
}

impl RelayState {
    /// Build an in-memory adapter sized by `config`.
    pub fn new(config: RelayConfig) -> Self {
        let adapter = BlobAdapter::memory(blob_config(&config));
        Self::from_parts(Arc::new(adapter), config)
    }

    pub fn from_parts(adapter: Arc<BlobAdapter>, config: RelayConfig) -> Self {
        Self {
            adapter,
            config: Arc::new(config),
        }
    }
}

/// Storage limits derived from the service configuration.
pub fn blob_config(config: &RelayConfig) -> BlobConfig {
    BlobConfig::default()
        .with_max_blob_bytes(config.max_file_bytes())
        .with_ttl(config.ttl)
}
