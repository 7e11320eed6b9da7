//! HMAC signing and verification of time-limited URLs.
//!
//! A signed URL carries two reserved query parameters appended by the
//! signer: `expires` (a Unix timestamp, present only when the configured TTL
//! is non-zero) and `signature` (the encoded HMAC of everything before it).
//! Anyone holding the same secret can later check that the URL is unmodified
//! and still inside its validity window, without any server-side state.
//!
//! # Overview
//!
//! Signing and verification share one canonical form: the URL is split into
//! its prefix and an ordered list of decoded query parameters, reserved
//! parameters are dropped, and the remainder is re-encoded deterministically.
//! The verifier first insists that the incoming URL is exactly as issued (no
//! fragment, no stray `&`), then rebuilds that form (keeping `expires`,
//! which was part of what got signed), recomputes the HMAC, and only then looks
//! at the expiry. A tampered URL is therefore always [`VerificationOutcome::Invalid`],
//! never [`VerificationOutcome::Expired`].
//!
//! # Usage
//!
//! ```rust
//! use signurl_auth::{SignerOptions, VerificationOutcome, signed_url, verify_signed_url};
//!
//! let config = SignerOptions::new()
//!     .secret_key("mySuperSecurePrivateKey")
//!     .ttl_seconds(3600)
//!     .configure()
//!     .unwrap();
//!
//! let signed = signed_url(&config, "http://site.com?id=50").unwrap();
//! assert!(signed.starts_with("http://site.com?id=50&expires="));
//! assert_eq!(verify_signed_url(&config, &signed).unwrap(), VerificationOutcome::Valid);
//!
//! let tampered = format!("{signed}t");
//! assert_eq!(verify_signed_url(&config, &tampered).unwrap(), VerificationOutcome::Invalid);
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - URL parsing, reserved-parameter handling, deterministic serialization
//! - [`error`] - Error taxonomy for signing and verification
//! - [`handle`] - Swappable shared configuration for long-lived services
//! - [`signer`] - HMAC computation and signed URL construction
//! - [`verifier`] - Signature and expiry checks producing a [`VerificationOutcome`]

pub mod canonical;
pub mod error;
pub mod handle;
pub mod signer;
pub mod verifier;

pub use canonical::{CanonicalUrl, EXPIRES_PARAM, RESERVED_PARAMS, SIGNATURE_PARAM, canonicalize};
pub use error::{AuthError, AuthResult};
pub use handle::UrlSigner;
pub use signer::{sign, signed_url, signed_url_at, url_signature};
pub use signurl_core::{
    ConfigError, DigestEncoding, SignerConfig, SignerOptions, SigningAlgorithm, configure,
};
pub use verifier::{VerificationOutcome, verify_signature, verify_signed_url, verify_signed_url_at};
