//! Signer configuration.
//!
//! [`SignerConfig`] is the immutable value every signing and verification
//! operation reads. It is produced from a [`SignerOptions`] bag, which may come
//! from code, from JSON, or from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `SIGNURL_SECRET_KEY` | *(required)* |
//! | `SIGNURL_ALGORITHM` | `sha256` |
//! | `SIGNURL_DIGEST_ENCODING` | `base64` |
//! | `SIGNURL_TTL_SECONDS` | `3600` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Default validity window of a freshly signed URL, in seconds.
pub const DEFAULT_TTL_SECONDS: u64 = 3600;

/// HMAC hash function used to sign URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningAlgorithm {
    /// HMAC-SHA1.
    Sha1,
    /// HMAC-SHA256.
    #[default]
    Sha256,
    /// HMAC-SHA384.
    Sha384,
    /// HMAC-SHA512.
    Sha512,
}

impl SigningAlgorithm {
    /// The canonical lowercase identifier (`"sha256"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "");
        match normalized.as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(ConfigError::UnsupportedAlgorithm(s.to_owned())),
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text encoding applied to the raw HMAC digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestEncoding {
    /// Standard base64 alphabet with padding.
    #[default]
    Base64,
    /// URL-safe base64 alphabet without padding.
    Base64Url,
    /// Lowercase hexadecimal.
    Hex,
}

impl DigestEncoding {
    /// The canonical lowercase identifier (`"base64"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Base64Url => "base64url",
            Self::Hex => "hex",
        }
    }
}

impl FromStr for DigestEncoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base64" => Ok(Self::Base64),
            "base64url" => Ok(Self::Base64Url),
            "hex" => Ok(Self::Hex),
            _ => Err(ConfigError::UnsupportedEncoding(s.to_owned())),
        }
    }
}

impl fmt::Display for DigestEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unvalidated configuration inputs.
///
/// Every field is optional so the bag can be filled piecemeal from code, JSON,
/// or the environment. [`SignerOptions::configure`] checks it and fills in the
/// defaults.
///
/// # Examples
///
/// ```
/// use signurl_core::SignerOptions;
///
/// let config = SignerOptions::new()
///     .secret_key("mySuperSecurePrivateKey")
///     .ttl_seconds(60)
///     .configure()
///     .unwrap();
/// assert_eq!(config.ttl_seconds(), 60);
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignerOptions {
    /// Shared secret used as the HMAC key. Required.
    pub secret_key: Option<String>,
    /// Hash algorithm identifier, `sha256` when unset.
    pub algorithm: Option<String>,
    /// Digest encoding identifier, `base64` when unset.
    pub digest_encoding: Option<String>,
    /// Validity window in seconds, `3600` when unset. `0` disables expiry.
    pub ttl_seconds: Option<u64>,
}

impl SignerOptions {
    /// Create an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shared secret.
    #[must_use]
    pub fn secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Set the hash algorithm identifier.
    #[must_use]
    pub fn algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    /// Set the digest encoding identifier.
    #[must_use]
    pub fn digest_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.digest_encoding = Some(encoding.into());
        self
    }

    /// Set the validity window in seconds.
    #[must_use]
    pub fn ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = Some(ttl_seconds);
        self
    }

    /// Validate the options and build a [`SignerConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSecretKey`] when the secret is absent or
    /// empty, and the matching variant for an unknown algorithm, unknown
    /// encoding, or out-of-range TTL.
    pub fn configure(self) -> ConfigResult<SignerConfig> {
        let secret_key = self
            .secret_key
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecretKey)?;

        let algorithm: SigningAlgorithm = self
            .algorithm
            .as_deref()
            .map(str::parse::<SigningAlgorithm>)
            .transpose()?
            .unwrap_or_default();
        let digest_encoding: DigestEncoding = self
            .digest_encoding
            .as_deref()
            .map(str::parse::<DigestEncoding>)
            .transpose()?
            .unwrap_or_default();
        let ttl_seconds = self.ttl_seconds.unwrap_or(DEFAULT_TTL_SECONDS);
        check_ttl(ttl_seconds)?;

        debug!(
            %algorithm,
            %digest_encoding,
            ttl_seconds,
            "configured URL signer"
        );

        Ok(SignerConfig {
            secret_key: secret_key.into_bytes(),
            algorithm,
            digest_encoding,
            ttl_seconds,
        })
    }
}

impl fmt::Debug for SignerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerOptions")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("algorithm", &self.algorithm)
            .field("digest_encoding", &self.digest_encoding)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

/// Build a [`SignerConfig`] from options, applying defaults for unset fields.
///
/// # Errors
///
/// See [`SignerOptions::configure`].
pub fn configure(options: SignerOptions) -> ConfigResult<SignerConfig> {
    options.configure()
}

/// Validated, immutable signer configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct SignerConfig {
    secret_key: Vec<u8>,
    algorithm: SigningAlgorithm,
    digest_encoding: DigestEncoding,
    ttl_seconds: u64,
}

impl SignerConfig {
    /// Build a configuration from a raw secret with every other field defaulted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSecretKey`] if `secret_key` is empty.
    pub fn new(secret_key: impl AsRef<[u8]>) -> ConfigResult<Self> {
        let secret_key = secret_key.as_ref();
        if secret_key.is_empty() {
            return Err(ConfigError::MissingSecretKey);
        }
        Ok(Self {
            secret_key: secret_key.to_vec(),
            algorithm: SigningAlgorithm::default(),
            digest_encoding: DigestEncoding::default(),
            ttl_seconds: DEFAULT_TTL_SECONDS,
        })
    }

    /// Load the configuration from `SIGNURL_*` environment variables.
    ///
    /// # Errors
    ///
    /// Fails when `SIGNURL_SECRET_KEY` is unset or any other variable is invalid.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`SignerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut options = SignerOptions::new();
        options.secret_key = lookup("SIGNURL_SECRET_KEY");
        options.algorithm = lookup("SIGNURL_ALGORITHM");
        options.digest_encoding = lookup("SIGNURL_DIGEST_ENCODING");
        if let Some(v) = lookup("SIGNURL_TTL_SECONDS") {
            let ttl = v
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTtl(v.clone()))?;
            options.ttl_seconds = Some(ttl);
        }
        options.configure()
    }

    /// Return a copy of this configuration with a different algorithm.
    #[must_use]
    pub fn with_algorithm(&self, algorithm: SigningAlgorithm) -> Self {
        Self {
            algorithm,
            ..self.clone()
        }
    }

    /// Return a copy of this configuration with a different digest encoding.
    #[must_use]
    pub fn with_digest_encoding(&self, digest_encoding: DigestEncoding) -> Self {
        Self {
            digest_encoding,
            ..self.clone()
        }
    }

    /// Return a copy of this configuration with a different TTL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTtl`] if `ttl_seconds` exceeds `i64::MAX`.
    pub fn with_ttl_seconds(&self, ttl_seconds: u64) -> ConfigResult<Self> {
        check_ttl(ttl_seconds)?;
        Ok(Self {
            ttl_seconds,
            ..self.clone()
        })
    }

    /// The HMAC key.
    #[must_use]
    pub fn secret_key(&self) -> &[u8] {
        &self.secret_key
    }

    /// The HMAC hash algorithm.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// The digest encoding.
    #[must_use]
    pub fn digest_encoding(&self) -> DigestEncoding {
        self.digest_encoding
    }

    /// The validity window in seconds; `0` means signed URLs never expire.
    #[must_use]
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Compute the `expires` timestamp for a URL signed at `now`.
    ///
    /// Returns `None` when the TTL is zero.
    #[must_use]
    pub fn expires_at(&self, now: i64) -> Option<i64> {
        if self.ttl_seconds == 0 {
            return None;
        }
        let ttl = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX);
        Some(now.saturating_add(ttl))
    }
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerConfig")
            .field("secret_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("digest_encoding", &self.digest_encoding)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

fn check_ttl(ttl_seconds: u64) -> ConfigResult<()> {
    if i64::try_from(ttl_seconds).is_err() {
        return Err(ConfigError::InvalidTtl(ttl_seconds.to_string()));
    }
    Ok(())
}
