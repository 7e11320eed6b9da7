//! Signed URL verification.
//!
//! Verification rebuilds the exact string the signer hashed and compares
//! signatures before it ever looks at the expiry:
//!
//! 1. Canonicalize the URL. Unless the input is byte-for-byte what the signer
//!    hands out (no fragment, no empty or re-encoded query segments), it is
//!    [`VerificationOutcome::Invalid`].
//! 2. Pull out the `signature` parameter. `expires` stays in place because it
//!    was part of the signed string.
//! 3. Recompute the HMAC over the residual serialization.
//! 4. Mismatch => [`VerificationOutcome::Invalid`].
//! 5. Match, with `expires` in the past => [`VerificationOutcome::Expired`].
//! 6. Otherwise => [`VerificationOutcome::Valid`].
//!
//! Signatures are compared in constant time.

use std::fmt;

use chrono::Utc;
use signurl_core::SignerConfig;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::canonical::{CanonicalUrl, EXPIRES_PARAM, SIGNATURE_PARAM};
use crate::error::AuthResult;
use crate::signer::url_signature;

/// Result of checking a signed URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationOutcome {
    /// The signature matches and the URL has not expired.
    Valid,
    /// The signature is missing, duplicated, or does not match, or the URL
    /// was altered outside the signed form.
    Invalid,
    /// The signature matches but the `expires` timestamp has passed.
    Expired,
}

impl VerificationOutcome {
    /// Whether the URL grants access.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }

    /// Lowercase name of the outcome.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check `signature` against the signature of `url` taken as-is.
///
/// # Examples
///
/// ```
/// use signurl_auth::{SignerConfig, url_signature, verify_signature};
///
/// let config = SignerConfig::new("secret").unwrap();
/// let signature = url_signature(&config, "http://site.com/a");
/// assert!(verify_signature(&config, &signature, "http://site.com/a"));
/// assert!(!verify_signature(&config, &format!("{signature}x"), "http://site.com/a"));
/// ```
#[must_use]
pub fn verify_signature(config: &SignerConfig, signature: &str, url: &str) -> bool {
    let expected = url_signature(config, url);
    signature.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Verify a signed URL against the current time.
///
/// # Errors
///
/// Returns [`AuthError::MalformedUrl`](crate::AuthError::MalformedUrl) if `url`
/// cannot be parsed. Rejections are reported through the returned outcome.
pub fn verify_signed_url(config: &SignerConfig, url: &str) -> AuthResult<VerificationOutcome> {
    verify_signed_url_at(config, url, Utc::now().timestamp())
}

/// Verify a signed URL as of Unix time `now`.
///
/// # Errors
///
/// Returns [`AuthError::MalformedUrl`](crate::AuthError::MalformedUrl) if `url`
/// cannot be parsed.
pub fn verify_signed_url_at(
    config: &SignerConfig,
    url: &str,
    now: i64,
) -> AuthResult<VerificationOutcome> {
    let mut canonical = CanonicalUrl::parse(url)?;

    if canonical.fragment().is_some() || canonical.to_url_string() != url {
        debug!(
            url = %url,
            fragment = ?canonical.fragment(),
            "Signed URL is not in the form it was issued in"
        );
        return Ok(VerificationOutcome::Invalid);
    }

    let signatures = canonical.remove(SIGNATURE_PARAM);
    let [provided] = signatures.as_slice() else {
        debug!(count = signatures.len(), "Signed URL must carry exactly one signature");
        return Ok(VerificationOutcome::Invalid);
    };

    let expires = match canonical.get_all(EXPIRES_PARAM).as_slice() {
        [] => None,
        [value] => Some((*value).to_owned()),
        values => {
            debug!(count = values.len(), "Signed URL carries duplicate expires");
            return Ok(VerificationOutcome::Invalid);
        }
    };

    let residual = canonical.serialize();
    if !verify_signature(config, provided, &residual) {
        debug!(url = %residual, provided = %provided, "Signed URL signature mismatch");
        return Ok(VerificationOutcome::Invalid);
    }

    let Some(expires) = expires else {
        debug!(url = %residual, "Signed URL verified, no expiry");
        return Ok(VerificationOutcome::Valid);
    };

    let Ok(expires) = expires.parse::<i64>() else {
        debug!(expires = %expires, "Signed URL carries a non-integer expires");
        return Ok(VerificationOutcome::Invalid);
    };

    if now > expires {
        debug!(expires, now, "Signed URL has expired");
        Ok(VerificationOutcome::Expired)
    } else {
        debug!(url = %residual, expires, "Signed URL verified");
        Ok(VerificationOutcome::Valid)
    }
}
