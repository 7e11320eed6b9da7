//! Gateway service in front of the signed URL validator.
//!
//! Health-check endpoints (`/_health`, `/health`) are answered directly so
//! container health checks never need a signature. Every other request goes
//! through [`SignedUrlValidator`].

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::{Either, Full};
use hyper::service::Service;
use signurl_http::{SignedUrlValidator, ValidatedBody};

use crate::resource::ResourceService;

/// Response body of every gateway response.
pub type GatewayBody = ValidatedBody<Full<Bytes>>;

/// Answers health checks locally and sends everything else through the validator.
#[derive(Debug, Clone)]
pub struct GatewayService {
    protected: SignedUrlValidator<ResourceService>,
}

impl GatewayService {
    /// Create a gateway around a validator-guarded resource service.
    #[must_use]
    pub fn new(protected: SignedUrlValidator<ResourceService>) -> Self {
        Self { protected }
    }
}

impl<B: Send + 'static> Service<http::Request<B>> for GatewayService {
    type Response = http::Response<GatewayBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        if is_health_check(req.method(), req.uri().path()) {
            return Box::pin(async { Ok(health_check_response()) });
        }

        self.protected.call(req)
    }
}

/// Whether the request targets a health endpoint.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/_health" || path == "/health")
}

/// Produce the health check response.
fn health_check_response() -> http::Response<GatewayBody> {
    let body = format!(
        r#"{{"services":{{"signurl":"running"}},"version":"{}"}}"#,
        crate::VERSION
    );
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Either::Left(Full::new(Bytes::from(body))))
        .expect("static health response should be valid")
}
