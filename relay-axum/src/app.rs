use axum::Router;
use relay_core::RelayConfig;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::rest;
use crate::RelayState;

/// The relay's HTTP surface: routes, request ids and tracing over one
/// [`RelayState`].
#[derive(Clone)]
pub struct RelayApp {
    pub state: RelayState,
    pub router: Router<()>,
}

impl RelayApp {
    pub fn new(config: RelayConfig) -> Self {
        Self::from_state(RelayState::new(config))
    }

    pub fn from_state(state: RelayState) -> Self {
        // Layers wrap outward: the id is set before tracing sees the request
        // and copied onto whatever response comes back.
        let router = rest::relay_router(state.clone())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        Self { state, router }
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "relay listening");
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

pub fn relay(config: RelayConfig) -> RelayApp {
    RelayApp::new(config)
}
