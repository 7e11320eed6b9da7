//! hyper middleware that only lets requests through when they arrive on a
//! valid signed URL.
//!
//! [`SignedUrlValidator`] wraps any hyper [`Service`](hyper::service::Service).
//! For each request it rebuilds the URL the client followed, verifies it with
//! [`signurl_auth`], and then either forwards the request to the inner service
//! or answers with the response produced by its [`ValidatorPolicy`]:
//!
//! | Outcome | Default response |
//! |---------|------------------|
//! | `Valid` | forwarded to the inner service |
//! | `Invalid` | `403 Forbidden` |
//! | `Expired` | `410 Gone` |
//!
//! The verification logic itself lives in `signurl-auth`; this crate only
//! maps requests to URLs and outcomes to responses.

pub mod body;
pub mod policy;
pub mod validator;

pub use body::{RejectionBody, ValidatedBody};
pub use policy::{RejectionHandler, ValidatorPolicy, expired_response, invalid_response};
pub use validator::{SignedUrlValidator, make_validator, request_url};
