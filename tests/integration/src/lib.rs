//! Integration tests for signurl.
//!
//! Two suites live here:
//!
//! - [`test_validator`] starts an in-process hyper server on a loopback port
//!   and drives it with a real HTTP client. It runs with a plain `cargo test`.
//! - [`test_server`] talks to a running `signurl-server` at
//!   `SIGNURL_ENDPOINT_URL` (default `http://localhost:8080`) started with the
//!   same `SIGNURL_SECRET_KEY`. Those tests are marked `#[ignore]`.
//!
//! Run the server suite with:
//! ```text
//! SIGNURL_SECRET_KEY=integration-secret cargo run -p signurl-server &
//! cargo test -p signurl-integration -- --ignored
//! ```

use std::convert::Infallible;
use std::future::{Ready, ready};
use std::sync::Once;

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::Service;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use signurl_auth::SignerConfig;
use signurl_http::SignedUrlValidator;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::debug;

mod test_server;
mod test_validator;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL of the externally started server.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("SIGNURL_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned())
}

/// Secret shared with the externally started server.
#[must_use]
pub fn secret_key() -> String {
    std::env::var("SIGNURL_SECRET_KEY").unwrap_or_else(|_| "integration-secret".to_owned())
}

/// Inner service that answers `ok <path>` to every request it receives.
#[derive(Debug, Clone, Copy)]
pub struct EchoService;

impl<B> Service<http::Request<B>> for EchoService {
    type Response = http::Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let body = format!("ok {}", req.uri().path());
        ready(Ok(http::Response::new(Full::new(Bytes::from(body)))))
    }
}

/// A validator served on a loopback port; the accept loop stops on drop.
#[derive(Debug)]
pub struct TestServer {
    /// `http://127.0.0.1:<port>`.
    base_url: String,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Absolute URL for `path_and_query` on this server.
    #[must_use]
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{path_and_query}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Serve `validator` on an ephemeral loopback port.
pub async fn spawn_server(validator: SignedUrlValidator<EchoService>) -> TestServer {
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind loopback listener");
    let addr = listener.local_addr().expect("listener has a local address");
    debug!(%addr, "test server listening");

    let task = tokio::spawn(async move {
        let http = HttpConnBuilder::new(TokioExecutor::new());
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                continue;
            };
            let conn = http
                .serve_connection(TokioIo::new(stream), validator.clone())
                .into_owned();
            tokio::spawn(async move {
                let _ = conn.await;
            });
        }
    });

    TestServer {
        base_url: format!("http://{addr}"),
        task,
    }
}

/// Serve [`EchoService`] behind a validator using `config` and the default policy.
pub async fn spawn_validated_server(config: SignerConfig) -> TestServer {
    spawn_server(SignedUrlValidator::new(EchoService, config)).await
}
