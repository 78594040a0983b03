//! relay-core: configuration and error types shared by the relay crates.

pub mod config;
pub mod errors;

pub use config::{PublicConfig, RelayConfig, DEFAULT_VIEWER_BASE_URL};
pub use errors::{ErrorKind, RelayError};
