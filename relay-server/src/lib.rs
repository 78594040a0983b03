use std::sync::Arc;

use relay_axum::{RelayApp, RelayState};
use relay_blob::ExpiryReaper;
use relay_core::RelayConfig;
use tokio::task::JoinHandle;

/// Build the HTTP app for `config`.
pub fn build(config: RelayConfig) -> RelayApp {
    RelayApp::new(config)
}

/// Start the background expiry sweep for the app's blob store.
pub fn spawn_reaper(state: &RelayState) -> JoinHandle<()> {
    ExpiryReaper::with_interval(Arc::clone(&state.adapter), state.config.sweep_interval).spawn()
}
