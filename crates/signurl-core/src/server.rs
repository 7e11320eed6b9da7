//! Settings for the `signurl-server` binary.
//!
//! Provides [`ServerConfig`]: where the gate listens, how loudly it logs, and
//! which scheme it assumes when rebuilding the URL a client followed. Values
//! come from `SIGNURL_*` variables, like the signer configuration.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default bind address of the signed URL gate.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Settings of the signed URL gate.
///
/// # Examples
///
/// ```
/// use signurl_core::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.listen_addr, "0.0.0.0:8080");
/// assert_eq!(config.local_addr(), "127.0.0.1:8080");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Address the gate binds to.
    #[builder(default = String::from(DEFAULT_LISTEN_ADDR))]
    pub listen_addr: String,

    /// `tracing` filter used when `RUST_LOG` is unset.
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Scheme prepended to origin-form request targets when rebuilding the
    /// URL a client followed. Set it to `https` behind a TLS terminator.
    #[builder(default = String::from("http"))]
    pub public_scheme: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ServerConfig {
    /// Load the settings from the process environment.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SIGNURL_LISTEN` | `0.0.0.0:8080` |
    /// | `SIGNURL_LOG_LEVEL` | `info` |
    /// | `SIGNURL_PUBLIC_SCHEME` | `http` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the settings through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(v) = lookup("SIGNURL_LISTEN") {
            config.listen_addr = v;
        }
        if let Some(v) = lookup("SIGNURL_LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("SIGNURL_PUBLIC_SCHEME") {
            config.public_scheme = v;
        }
        config
    }

    /// Loopback address `--health-check` on this host should dial.
    ///
    /// A wildcard bind (`0.0.0.0` or `[::]`) is not connectable, so it is
    /// swapped for the matching loopback address.
    #[must_use]
    pub fn local_addr(&self) -> String {
        if let Some(port) = self.listen_addr.strip_prefix("0.0.0.0:") {
            format!("127.0.0.1:{port}")
        } else if let Some(port) = self.listen_addr.strip_prefix("[::]:") {
            format!("[::1]:{port}")
        } else {
            self.listen_addr.clone()
        }
    }
}
