//! Configuration errors.

/// Errors raised while building a [`SignerConfig`](crate::SignerConfig).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No secret key was supplied, or it was empty.
    #[error("secret key is required and must not be empty")]
    MissingSecretKey,

    /// The hash algorithm identifier is not one of the supported HMAC digests.
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The digest encoding identifier is not recognised.
    #[error("unsupported digest encoding: {0}")]
    UnsupportedEncoding(String),

    /// The time-to-live is not a non-negative integer that fits in a Unix timestamp.
    #[error("invalid ttl seconds: {0}")]
    InvalidTtl(String),
}

/// Convenience result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
