use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::BlobAdapter;

/// Periodic sweep that retires expired blobs regardless of access.
///
/// Runs alongside each blob's own scheduled deletion; whichever fires second
/// finds nothing to remove.
pub struct ExpiryReaper {
    adapter: Arc<BlobAdapter>,
    interval: Duration,
}

impl ExpiryReaper {
    /// Create a reaper with the default two minute period
    pub fn new(adapter: Arc<BlobAdapter>) -> Self {
        Self {
            adapter,
            interval: Duration::from_secs(120),
        }
    }

    /// Create reaper with custom interval
    pub fn with_interval(adapter: Arc<BlobAdapter>, interval: Duration) -> Self {
        Self { adapter, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the sweep loop forever
    pub async fn start(self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Starting expiry reaper with interval: {:?}", self.interval);

        loop {
            ticker.tick().await;
            self.sweep_once();
        }
    }

    /// Start the loop on the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.start())
    }

    /// Run one sweep cycle (for testing)
    pub fn sweep_once(&self) -> usize {
        let evicted = self.adapter.sweep();
        if evicted > 0 {
            info!("Evicted {} expired blobs", evicted);
        } else {
            debug!("No expired blobs found");
        }
        evicted
    }
}
