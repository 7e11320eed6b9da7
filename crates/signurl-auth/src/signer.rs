//! HMAC signature computation and signed URL construction.
//!
//! The signing flow for a URL is:
//!
//! 1. Canonicalize the input and drop any `expires` / `signature` it carries.
//! 2. When the TTL is non-zero, append `expires=<now + ttl>`.
//! 3. HMAC the serialized result with the configured key and hash, then encode
//!    the raw digest with the configured encoding.
//! 4. Append `signature=<digest>` and serialize again.
//!
//! The main entry point is [`signed_url`].

use base64::Engine;
use base64::engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD as BASE64_URL};
use chrono::Utc;
use digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use signurl_core::{DigestEncoding, SignerConfig, SigningAlgorithm};
use tracing::debug;

use crate::canonical::{CanonicalUrl, EXPIRES_PARAM, SIGNATURE_PARAM};
use crate::error::AuthResult;

/// Compute the encoded HMAC of `canonical` under `config`.
///
/// This is a pure function of its inputs.
///
/// # Examples
///
/// ```
/// use signurl_auth::{SignerConfig, sign};
///
/// let config = SignerConfig::new("Jefe").unwrap();
/// assert_eq!(
///     sign(&config, "what do ya want for nothing?"),
///     "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM="
/// );
/// ```
#[must_use]
pub fn sign(config: &SignerConfig, canonical: &str) -> String {
    let digest = compute_hmac(config.algorithm(), config.secret_key(), canonical.as_bytes());
    encode_digest(config.digest_encoding(), &digest)
}

/// Compute the signature of `url` exactly as given, without canonicalizing it.
#[must_use]
pub fn url_signature(config: &SignerConfig, url: &str) -> String {
    sign(config, url)
}

/// Produce a signed URL valid from the current time.
///
/// # Errors
///
/// Returns [`AuthError::MalformedUrl`](crate::AuthError::MalformedUrl) if `url`
/// cannot be parsed.
pub fn signed_url(config: &SignerConfig, url: &str) -> AuthResult<String> {
    signed_url_at(config, url, Utc::now().timestamp())
}

/// Produce a signed URL as if signed at Unix time `now`.
///
/// Any `expires` or `signature` parameters already present in `url` are
/// discarded before signing, and so is the fragment.
///
/// # Errors
///
/// Returns [`AuthError::MalformedUrl`](crate::AuthError::MalformedUrl) if `url`
/// cannot be parsed.
pub fn signed_url_at(config: &SignerConfig, url: &str, now: i64) -> AuthResult<String> {
    let mut canonical = CanonicalUrl::parse(url)?.strip_reserved();

    let expires = config.expires_at(now);
    if let Some(expires) = expires {
        canonical.append(EXPIRES_PARAM, expires.to_string());
    }

    let string_to_sign = canonical.serialize();
    let signature = url_signature(config, &string_to_sign);

    debug!(
        url = %string_to_sign,
        expires = ?expires,
        algorithm = %config.algorithm(),
        "Signed URL"
    );

    canonical.append(SIGNATURE_PARAM, signature);
    Ok(canonical.to_url_string())
}

/// Compute the raw HMAC digest of `data` with the given algorithm.
pub(crate) fn compute_hmac(algorithm: SigningAlgorithm, key: &[u8], data: &[u8]) -> Vec<u8> {
    match algorithm {
        SigningAlgorithm::Sha1 => hmac_digest::<Hmac<Sha1>>(key, data),
        SigningAlgorithm::Sha256 => hmac_digest::<Hmac<Sha256>>(key, data),
        SigningAlgorithm::Sha384 => hmac_digest::<Hmac<Sha384>>(key, data),
        SigningAlgorithm::Sha512 => hmac_digest::<Hmac<Sha512>>(key, data),
    }
}

/// Encode a raw digest for transport in a query string.
pub(crate) fn encode_digest(encoding: DigestEncoding, digest: &[u8]) -> String {
    match encoding {
        DigestEncoding::Base64 => BASE64.encode(digest),
        DigestEncoding::Base64Url => BASE64_URL.encode(digest),
        DigestEncoding::Hex => hex::encode(digest),
    }
}

fn hmac_digest<M: Mac + KeyInit>(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = <M as KeyInit>::new_from_slice(key).expect("HMAC can accept keys of any length");
    Mac::update(&mut mac, data);
    Mac::finalize(mac).into_bytes().to_vec()
}
