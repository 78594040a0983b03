//! # Relay configuration
//!
//! Settings are read from environment variables once at startup.
//! Unset or unparseable values fall back to their defaults, so a bare
//! `relay-server` invocation always comes up.
//!
//! ```rust
//! use relay_core::RelayConfig;
//!
//! let config = RelayConfig::from_lookup(|key| match key {
//!     "PORT" => Some("8080".to_string()),
//!     "TTL_MINUTES" => Some("3".to_string()),
//!     _ => None,
//! });
//!
//! assert_eq!(config.port, 8080);
//! assert_eq!(config.ttl_minutes(), 3);
//! assert_eq!(config.public_base_url, "http://localhost:8080");
//! ```
//!
//! | variable              | default                   |
//! |-----------------------|---------------------------|
//! | `HTTP_HOST`           | `0.0.0.0`                 |
//! | `PORT`                | `3000`                    |
//! | `TTL_MINUTES`         | `10`                      |
//! | `MAX_FILE_MB`         | `5`                       |
//! | `PUBLIC_BASE_URL`     | `http://localhost:<PORT>` |
//! | `SWEEP_INTERVAL_SECS` | `120`                     |
//! | `VIEWER_BASE_URL`     | Office Online embed URL   |

use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

/// Office Online viewer; the encoded file URL is appended to it.
pub const DEFAULT_VIEWER_BASE_URL: &str = "https://view.officeapps.live.com/op/view.aspx?src=";

struct Defaults;

impl Defaults {
    const HOST: &'static str = "0.0.0.0";
    const PORT: u16 = 3000;
    const TTL_MINUTES: u64 = 10;
    const MAX_FILE_MB: u64 = 5;
    const SWEEP_INTERVAL_SECS: u64 = 120;
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// How long an upload stays retrievable
    pub ttl: Duration,
    /// Upload ceiling in mebibytes
    pub max_file_mb: u64,
    /// Base for `fileUrl` when the request carries no forwarded host
    pub public_base_url: String,
    /// Period of the background expiry sweep
    pub sweep_interval: Duration,
    pub viewer_base_url: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: Defaults::HOST.to_string(),
            port: Defaults::PORT,
            ttl: Duration::from_secs(Defaults::TTL_MINUTES * 60),
            max_file_mb: Defaults::MAX_FILE_MB,
            public_base_url: default_base_url(Defaults::PORT),
            sweep_interval: Duration::from_secs(Defaults::SWEEP_INTERVAL_SECS),
            viewer_base_url: DEFAULT_VIEWER_BASE_URL.to_string(),
        }
    }
}

impl RelayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "PORT", Defaults::PORT);
        let ttl_minutes = parse_or(&lookup, "TTL_MINUTES", Defaults::TTL_MINUTES);
        let sweep_secs = parse_or(&lookup, "SWEEP_INTERVAL_SECS", Defaults::SWEEP_INTERVAL_SECS);

        let public_base_url = non_empty(&lookup, "PUBLIC_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| default_base_url(port));

        Self {
            host: non_empty(&lookup, "HTTP_HOST").unwrap_or_else(|| Defaults::HOST.to_string()),
            port,
            ttl: Duration::from_secs(ttl_minutes.saturating_mul(60)),
            max_file_mb: parse_or(&lookup, "MAX_FILE_MB", Defaults::MAX_FILE_MB),
            public_base_url,
            sweep_interval: Duration::from_secs(sweep_secs.max(1)),
            viewer_base_url: non_empty(&lookup, "VIEWER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_VIEWER_BASE_URL.to_string()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_file_mb(mut self, mb: u64) -> Self {
        self.max_file_mb = mb;
        self
    }

    pub fn with_public_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.public_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_viewer_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.viewer_base_url = url.into();
        self
    }

    /// Upload ceiling in bytes.
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_mb.saturating_mul(1024 * 1024)
    }

    /// Whole minutes of TTL, as reported by `GET /config`.
    pub fn ttl_minutes(&self) -> u64 {
        self.ttl.as_secs() / 60
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The subset of settings clients may see.
    pub fn public_view(&self) -> PublicConfig {
        PublicConfig {
            public_base_url: self.public_base_url.clone(),
            ttl_minutes: self.ttl_minutes(),
            max_file_mb: self.max_file_mb,
        }
    }
}

/// Body of `GET /config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub public_base_url: String,
    pub ttl_minutes: u64,
    pub max_file_mb: u64,
}

fn default_base_url(port: u16) -> String {
    format!("http://localhost:{port}")
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    non_empty(lookup, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
