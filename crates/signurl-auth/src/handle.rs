//! Shared, swappable signer configuration.
//!
//! Long-lived services that want to rotate the configuration at runtime hold a
//! [`UrlSigner`] instead of a bare [`SignerConfig`]. The configuration sits
//! behind an `Arc` that is swapped as a whole: every operation takes one
//! snapshot up front, so a concurrent [`UrlSigner::configure`] can never hand
//! it a half-updated key. Operations on a signer that was never configured
//! fail with [`AuthError::NotConfigured`].

use std::sync::Arc;

use parking_lot::RwLock;
use signurl_core::{SignerConfig, SignerOptions};
use tracing::info;

use crate::error::{AuthError, AuthResult};
use crate::signer;
use crate::verifier::{self, VerificationOutcome};

/// Holder of the current signer configuration.
///
/// # Examples
///
/// ```
/// use signurl_auth::{AuthError, SignerOptions, UrlSigner};
///
/// let signer = UrlSigner::new();
/// assert!(matches!(signer.signed_url("/a"), Err(AuthError::NotConfigured)));
///
/// signer.configure(SignerOptions::new().secret_key("k")).unwrap();
/// let signed = signer.signed_url("/a").unwrap();
/// assert!(signer.verify_signed_url(&signed).unwrap().is_valid());
/// ```
#[derive(Debug, Default)]
pub struct UrlSigner {
    config: RwLock<Option<Arc<SignerConfig>>>,
}

impl UrlSigner {
    /// Create an unconfigured signer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a signer that starts with `config`.
    #[must_use]
    pub fn with_config(config: SignerConfig) -> Self {
        Self {
            config: RwLock::new(Some(Arc::new(config))),
        }
    }

    /// Validate `options` and install the result as the current configuration.
    ///
    /// On error the previous configuration, if any, stays in place.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if the options are rejected.
    pub fn configure(&self, options: SignerOptions) -> AuthResult<Arc<SignerConfig>> {
        let config = Arc::new(options.configure()?);
        self.install(Arc::clone(&config));
        Ok(config)
    }

    /// Install an already validated configuration, returning the previous one.
    pub fn replace(&self, config: SignerConfig) -> Option<Arc<SignerConfig>> {
        self.install(Arc::new(config))
    }

    /// Take a snapshot of the current configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotConfigured`] if none has been installed.
    pub fn snapshot(&self) -> AuthResult<Arc<SignerConfig>> {
        self.config.read().clone().ok_or(AuthError::NotConfigured)
    }

    /// See [`signer::url_signature`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotConfigured`] if no configuration is installed.
    pub fn url_signature(&self, url: &str) -> AuthResult<String> {
        let config = self.snapshot()?;
        Ok(signer::url_signature(&config, url))
    }

    /// See [`signer::signed_url`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotConfigured`] if no configuration is installed,
    /// or [`AuthError::MalformedUrl`] if `url` cannot be parsed.
    pub fn signed_url(&self, url: &str) -> AuthResult<String> {
        let config = self.snapshot()?;
        signer::signed_url(&config, url)
    }

    /// See [`verifier::verify_signature`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotConfigured`] if no configuration is installed.
    pub fn verify_signature(&self, signature: &str, url: &str) -> AuthResult<bool> {
        let config = self.snapshot()?;
        Ok(verifier::verify_signature(&config, signature, url))
    }

    /// See [`verifier::verify_signed_url`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotConfigured`] if no configuration is installed,
    /// or [`AuthError::MalformedUrl`] if `url` cannot be parsed.
    pub fn verify_signed_url(&self, url: &str) -> AuthResult<VerificationOutcome> {
        let config = self.snapshot()?;
        verifier::verify_signed_url(&config, url)
    }

    fn install(&self, config: Arc<SignerConfig>) -> Option<Arc<SignerConfig>> {
        info!(
            algorithm = %config.algorithm(),
            digest_encoding = %config.digest_encoding(),
            ttl_seconds = config.ttl_seconds(),
            "installed URL signer configuration"
        );
        self.config.write().replace(config)
    }
}

impl From<SignerConfig> for UrlSigner {
    fn from(config: SignerConfig) -> Self {
        Self::with_config(config)
    }
}
