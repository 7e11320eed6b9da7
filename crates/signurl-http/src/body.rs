//! Response body types produced by the validator.

use bytes::Bytes;
use http_body_util::{Either, Full};

/// Body of a response generated by the validator itself.
pub type RejectionBody = Full<Bytes>;

/// Body of any response leaving a [`SignedUrlValidator`](crate::SignedUrlValidator):
/// the inner service's body on the left, a rejection on the right.
pub type ValidatedBody<B> = Either<B, RejectionBody>;

/// Build a JSON rejection response.
pub(crate) fn json_response(
    status: http::StatusCode,
    body: &'static str,
) -> http::Response<RejectionBody> {
    http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .expect("static rejection response should be valid")
}
