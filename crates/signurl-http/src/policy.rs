//! What the validator answers when a request is rejected.
//!
//! Each rejection kind has its own handler. A handler receives the request
//! head and returns the full response, so callers can render HTML, redirect to
//! a re-signing endpoint, or keep the JSON defaults.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use http::request::Parts;
use signurl_auth::VerificationOutcome;

use crate::body::{RejectionBody, json_response};

/// Builds the response for a rejected request.
pub type RejectionHandler = Arc<dyn Fn(&Parts) -> http::Response<RejectionBody> + Send + Sync>;

const INVALID_BODY: &str =
    r#"{"error":"invalid_signature","message":"The URL signature is missing or does not match"}"#;
const EXPIRED_BODY: &str = r#"{"error":"expired","message":"The signed URL has expired"}"#;

/// Default `Invalid` response: `403 Forbidden` with a JSON body.
#[must_use]
pub fn invalid_response(_parts: &Parts) -> http::Response<RejectionBody> {
    json_response(StatusCode::FORBIDDEN, INVALID_BODY)
}

/// Default `Expired` response: `410 Gone` with a JSON body.
#[must_use]
pub fn expired_response(_parts: &Parts) -> http::Response<RejectionBody> {
    json_response(StatusCode::GONE, EXPIRED_BODY)
}

/// Rejection handlers and request-to-URL settings for a validator.
///
/// # Examples
///
/// ```
/// use http::StatusCode;
/// use signurl_http::ValidatorPolicy;
///
/// let policy = ValidatorPolicy::new()
///     .public_scheme("https")
///     .on_expired(|_parts| {
///         http::Response::builder()
///             .status(StatusCode::SEE_OTHER)
///             .header("Location", "/renew")
///             .body(Default::default())
///             .unwrap()
///     });
/// assert_eq!(policy.scheme(), "https");
/// ```
#[derive(Clone)]
pub struct ValidatorPolicy {
    public_scheme: String,
    on_invalid: RejectionHandler,
    on_expired: RejectionHandler,
}

impl Default for ValidatorPolicy {
    fn default() -> Self {
        Self {
            public_scheme: String::from("http"),
            on_invalid: Arc::new(invalid_response),
            on_expired: Arc::new(expired_response),
        }
    }
}

impl fmt::Debug for ValidatorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorPolicy")
            .field("public_scheme", &self.public_scheme)
            .field("on_invalid", &"...")
            .field("on_expired", &"...")
            .finish()
    }
}

impl ValidatorPolicy {
    /// Policy with `403` / `410` JSON responses and the `http` scheme.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheme used to rebuild the URL of origin-form requests.
    #[must_use]
    pub fn public_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.public_scheme = scheme.into();
        self
    }

    /// Replace the handler for requests whose signature does not verify.
    #[must_use]
    pub fn on_invalid<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Parts) -> http::Response<RejectionBody> + Send + Sync + 'static,
    {
        self.on_invalid = Arc::new(handler);
        self
    }

    /// Replace the handler for correctly signed requests past their expiry.
    #[must_use]
    pub fn on_expired<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Parts) -> http::Response<RejectionBody> + Send + Sync + 'static,
    {
        self.on_expired = Arc::new(handler);
        self
    }

    /// The configured public scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.public_scheme
    }

    /// The response for `outcome`, or `None` if the request may proceed.
    #[must_use]
    pub fn reject(
        &self,
        outcome: VerificationOutcome,
        parts: &Parts,
    ) -> Option<http::Response<RejectionBody>> {
        match outcome {
            VerificationOutcome::Valid => None,
            VerificationOutcome::Invalid => Some((self.on_invalid)(parts)),
            VerificationOutcome::Expired => Some((self.on_expired)(parts)),
        }
    }
}
