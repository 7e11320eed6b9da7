//! Error types for URL signing and verification.
//!
//! A rejected URL is not an error: signature mismatches and expired grants are
//! reported as [`VerificationOutcome`](crate::VerificationOutcome) values. The
//! variants here cover the cases where no evaluation could take place at all.

use signurl_core::ConfigError;

/// Errors that prevent a signing or verification operation from running.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The configuration supplied to the operation was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An operation was attempted on a [`UrlSigner`](crate::UrlSigner) before
    /// it was given a configuration.
    #[error("URL signer is not configured")]
    NotConfigured,

    /// The input could not be parsed as a URL.
    #[error("malformed URL: {0}")]
    MalformedUrl(String),
}

/// Convenience result type for signing and verification operations.
pub type AuthResult<T> = Result<T, AuthError>;
