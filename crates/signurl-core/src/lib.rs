//! Core configuration types for signurl.
//!
//! This crate holds the immutable values every signing and verification call
//! is parameterised by: the shared secret, the HMAC hash algorithm, the digest
//! encoding, and the time-to-live applied to freshly minted URLs. It also
//! carries the server-side settings used by the `signurl-server` binary.
//!
//! A [`SignerConfig`] is built once (via [`configure`], [`SignerConfig::new`],
//! or [`SignerConfig::from_env`]) and never mutated afterwards. Changing the
//! key means building a new value.

mod config;
mod error;
mod server;

pub use config::{
    DEFAULT_TTL_SECONDS, DigestEncoding, SignerConfig, SignerOptions, SigningAlgorithm, configure,
};
pub use error::{ConfigError, ConfigResult};
pub use server::{DEFAULT_LISTEN_ADDR, ServerConfig};
