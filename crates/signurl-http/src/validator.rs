//! The signed URL gate.
//!
//! [`SignedUrlValidator`] sits in front of an inner hyper service. The request
//! is never buffered: only the request head is needed to rebuild the URL, so
//! the body is handed to the inner service untouched on success and dropped on
//! rejection.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http_body_util::Either;
use hyper::service::Service;
use signurl_auth::{AuthError, SignerConfig, UrlSigner, VerificationOutcome};
use tracing::{debug, error, warn};

use crate::body::{ValidatedBody, json_response};
use crate::policy::ValidatorPolicy;

const NOT_CONFIGURED_BODY: &str =
    r#"{"error":"not_configured","message":"URL signing is not configured"}"#;

/// Rebuild the URL a client followed to produce this request.
///
/// Absolute-form targets (as sent to proxies) are used as they are. For
/// origin-form targets the URL is `<public_scheme>://<Host><path?query>`;
/// without a `Host` header only the path and query remain.
///
/// # Examples
///
/// ```
/// use signurl_http::request_url;
///
/// let req = http::Request::builder()
///     .uri("/download?id=7")
///     .header("Host", "files.example.com")
///     .body(())
///     .unwrap();
/// assert_eq!(
///     request_url(req.uri(), req.headers(), "https"),
///     "https://files.example.com/download?id=7"
/// );
/// ```
#[must_use]
pub fn request_url(uri: &http::Uri, headers: &http::HeaderMap, public_scheme: &str) -> String {
    if uri.scheme().is_some() && uri.authority().is_some() {
        return uri.to_string();
    }

    let path_and_query = uri
        .path_and_query()
        .map_or("/", http::uri::PathAndQuery::as_str);

    match headers
        .get(http::header::HOST)
        .and_then(|v| v.to_str().ok())
    {
        Some(host) => format!("{public_scheme}://{host}{path_and_query}"),
        None => path_and_query.to_owned(),
    }
}

/// Middleware that forwards a request only if its URL carries a valid signature.
///
/// # Type Parameters
///
/// - `S`: the inner service receiving validated requests.
#[derive(Debug)]
pub struct SignedUrlValidator<S> {
    inner: S,
    signer: Arc<UrlSigner>,
    policy: Arc<ValidatorPolicy>,
}

impl<S> SignedUrlValidator<S> {
    /// Guard `inner` with a fixed signer configuration and the default policy.
    #[must_use]
    pub fn new(inner: S, config: SignerConfig) -> Self {
        Self::from_shared(inner, Arc::new(UrlSigner::with_config(config)))
    }

    /// Guard `inner` with a shared signer whose configuration may be swapped
    /// at runtime.
    #[must_use]
    pub fn from_shared(inner: S, signer: Arc<UrlSigner>) -> Self {
        Self {
            inner,
            signer,
            policy: Arc::new(ValidatorPolicy::default()),
        }
    }

    /// Replace the rejection policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ValidatorPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Verify the URL of `req` without dispatching it.
    ///
    /// A URL that cannot be parsed is reported as `Invalid`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotConfigured`] if the shared signer has no
    /// configuration installed.
    pub fn evaluate<B>(&self, req: &http::Request<B>) -> Result<VerificationOutcome, AuthError> {
        let url = request_url(req.uri(), req.headers(), self.policy.scheme());
        match self.signer.verify_signed_url(&url) {
            Err(AuthError::MalformedUrl(reason)) => {
                debug!(%reason, "rejecting request with malformed URL");
                Ok(VerificationOutcome::Invalid)
            }
            other => other,
        }
    }
}

impl<S: Clone> Clone for SignedUrlValidator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            signer: Arc::clone(&self.signer),
            policy: Arc::clone(&self.policy),
        }
    }
}

impl<S, B, ResBody> Service<http::Request<B>> for SignedUrlValidator<S>
where
    S: Service<http::Request<B>, Response = http::Response<ResBody>> + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    B: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = http::Response<ValidatedBody<ResBody>>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let outcome = match self.evaluate(&req) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "cannot verify signed URL");
                let resp =
                    json_response(http::StatusCode::INTERNAL_SERVER_ERROR, NOT_CONFIGURED_BODY);
                return Box::pin(async move { Ok(resp.map(Either::Right)) });
            }
        };

        let (parts, body) = req.into_parts();
        if let Some(resp) = self.policy.reject(outcome, &parts) {
            warn!(
                method = %parts.method,
                path = %parts.uri.path(),
                %outcome,
                status = resp.status().as_u16(),
                "rejected signed URL request"
            );
            return Box::pin(async move { Ok(resp.map(Either::Right)) });
        }

        debug!(method = %parts.method, path = %parts.uri.path(), "signed URL accepted");
        let fut = self.inner.call(http::Request::from_parts(parts, body));
        Box::pin(async move { fut.await.map(|resp| resp.map(Either::Left)) })
    }
}

/// Guard `inner` with `config` and `policy`.
#[must_use]
pub fn make_validator<S>(
    inner: S,
    config: SignerConfig,
    policy: ValidatorPolicy,
) -> SignedUrlValidator<S> {
    SignedUrlValidator::new(inner, config).with_policy(policy)
}
