//! The protected resource handed out on valid signed URLs.

use std::convert::Infallible;
use std::future::{Ready, ready};

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::Service;

/// Describes the granted resource as JSON.
///
/// Stands in for whatever a deployment actually serves (file downloads,
/// reports); it only runs once the validator has accepted the request.
#[derive(Debug, Clone, Default)]
pub struct ResourceService;

impl<B> Service<http::Request<B>> for ResourceService {
    type Response = http::Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let body = serde_json::json!({
            "resource": req.uri().path(),
            "method": req.method().as_str(),
            "status": "granted",
        });

        let resp = http::Response::builder()
            .status(http::StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("resource response should be valid");
        ready(Ok(resp))
    }
}
