//! relay-axum: axum adapter for the ephemeral document relay.
//!
//! Exposes the relay's routes over a [`RelayState`]:
//!
//! | route                | handler                                   |
//! |----------------------|-------------------------------------------|
//! | `GET /health`        | liveness                                  |
//! | `GET /config`        | client-visible settings                   |
//! | `POST /upload`       | multipart `file` field into the blob store |
//! | `GET /f/{id}`        | full or ranged download                   |
//! | `GET /progress/{id}` | delivery progress                         |

pub mod app;
pub mod blob;
pub mod middlewares;
pub mod rest;
pub mod state;
mod error;
pub use error::{relay_error_from_blob, RelayAxumError};
pub use state::RelayState;

pub use app::{relay, RelayApp};
