//! signurl server - serves resources behind HMAC-signed, time-limited URLs.
//!
//! Every request except the health endpoints must arrive on a URL produced by
//! the same secret: unsigned or tampered URLs get `403`, correctly signed but
//! expired URLs get `410`. The binary can also mint and check URLs offline.
//!
//! # Usage
//!
//! ```text
//! SIGNURL_SECRET_KEY=... signurl-server
//! SIGNURL_SECRET_KEY=... signurl-server --sign http://localhost:8080/files/a.txt
//! SIGNURL_SECRET_KEY=... signurl-server --verify 'http://localhost:8080/files/a.txt?expires=...&signature=...'
//! signurl-server --health-check
//! ```
//!
//! `--verify` prints the outcome and exits with `0` (valid), `1` (invalid),
//! `2` (expired) or `3` (not a URL). `--health-check` exits with `0` when the
//! local gate reports itself running.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SIGNURL_LISTEN` | `0.0.0.0:8080` | Bind address |
//! | `SIGNURL_LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `SIGNURL_LOG_LEVEL`) |
//! | `SIGNURL_PUBLIC_SCHEME` | `http` | Scheme used to rebuild request URLs |
//! | `SIGNURL_SECRET_KEY` | *(required)* | HMAC secret |
//! | `SIGNURL_ALGORITHM` | `sha256` | `sha1`, `sha256`, `sha384` or `sha512` |
//! | `SIGNURL_DIGEST_ENCODING` | `base64` | `base64`, `base64url` or `hex` |
//! | `SIGNURL_TTL_SECONDS` | `3600` | Validity window; `0` never expires |

mod gateway;
mod resource;

use std::net::SocketAddr;

use std::future::Future;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use signurl_auth::{
    AuthError, AuthResult, SignerConfig, VerificationOutcome, signed_url, verify_signed_url,
};
use signurl_core::ServerConfig;
use signurl_http::{ValidatorPolicy, make_validator};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::gateway::GatewayService;
use crate::resource::ResourceService;

/// Server version reported in health check responses.
pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What the binary was asked to do.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Serve,
    HealthCheck,
    Sign(String),
    Verify(String),
}

/// Parse the process arguments (program name first).
fn parse_command(args: impl IntoIterator<Item = String>) -> Result<Command> {
    let mut args = args.into_iter().skip(1);
    let command = match args.next().as_deref() {
        None => Command::Serve,
        Some("--health-check") => Command::HealthCheck,
        Some("--sign") => Command::Sign(args.next().context("--sign requires a URL")?),
        Some("--verify") => Command::Verify(args.next().context("--verify requires a URL")?),
        Some(other) => anyhow::bail!("unknown argument: {other}"),
    };

    if let Some(extra) = args.next() {
        anyhow::bail!("unexpected argument: {extra}");
    }
    Ok(command)
}

/// Install the log subscriber for serve mode.
///
/// `RUST_LOG` wins when set; otherwise `SIGNURL_LOG_LEVEL` (as `log_level`)
/// is the filter. `--sign`, `--verify` and `--health-check` never log.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("SIGNURL_LOG_LEVEL is not a valid filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Load the signer configuration from `SIGNURL_*` environment variables.
fn load_signer_config() -> Result<SignerConfig> {
    SignerConfig::from_env().context("failed to load signer configuration")
}

/// Build the gateway: health endpoints plus the validator-guarded resource.
fn build_service(config: &ServerConfig, signer: SignerConfig) -> GatewayService {
    let policy = ValidatorPolicy::new().public_scheme(config.public_scheme.clone());
    GatewayService::new(make_validator(ResourceService, signer, policy))
}

/// Process exit code for `--verify`.
fn verify_exit_code(result: &AuthResult<VerificationOutcome>) -> i32 {
    match result {
        Ok(VerificationOutcome::Valid) => 0,
        Ok(VerificationOutcome::Invalid) => 1,
        Ok(VerificationOutcome::Expired) => 2,
        Err(AuthError::MalformedUrl(_)) => 3,
        Err(AuthError::Config(_) | AuthError::NotConfigured) => 4,
    }
}

/// Serve the gate on `listener` until `shutdown` resolves, then let
/// in-flight requests finish.
async fn serve(
    listener: TcpListener,
    service: GatewayService,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "signurl gate failed to accept a client");
                        continue;
                    }
                };

                let conn = http.serve_connection(TokioIo::new(stream), service.clone());
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "client connection failed");
                    }
                });
            }

            () = &mut shutdown => {
                info!("signurl gate stopped accepting, draining signed URL requests");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("signurl gate drained");

    Ok(())
}

/// Resolve on Ctrl-C.
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("cannot listen for Ctrl-C; stop the gate with a signal instead");
        std::future::pending::<()>().await;
    }
}

/// Ask the gate at `addr` for its health report and return the version it runs.
///
/// The health endpoint needs no signature, so this works with any key.
async fn run_health_check(addr: &str) -> Result<String> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let mut stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("signurl gate not reachable at {addr}"))?;

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;

    let mut response = String::new();
    stream.read_to_string(&mut response).await?;

    check_health_response(&response).with_context(|| format!("signurl gate at {addr} is unhealthy"))
}

/// Check a raw HTTP/1.1 health response and return the reported version.
///
/// Healthy means a `200` status and a JSON body with `services.signurl`
/// set to `"running"`.
fn check_health_response(raw: &str) -> Result<String> {
    let (head, body) = raw
        .split_once("\r\n\r\n")
        .context("health response has no body")?;
    let status_line = head.lines().next().unwrap_or_default();
    anyhow::ensure!(
        status_line.split_whitespace().nth(1) == Some("200"),
        "health endpoint answered `{status_line}`"
    );

    let report: serde_json::Value =
        serde_json::from_str(body.trim()).context("health body is not JSON")?;
    anyhow::ensure!(
        report["services"]["signurl"] == "running",
        "signurl service is not running"
    );

    Ok(report["version"].as_str().unwrap_or("unknown").to_owned())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env();

    match parse_command(std::env::args())? {
        Command::Serve => {}
        Command::HealthCheck => match run_health_check(&config.local_addr()).await {
            Ok(version) => {
                println!("healthy (signurl {version})");
                return Ok(());
            }
            Err(e) => {
                eprintln!("{e:#}");
                std::process::exit(1);
            }
        },
        Command::Sign(url) => {
            let signer = load_signer_config()?;
            println!("{}", signed_url(&signer, &url)?);
            return Ok(());
        }
        Command::Verify(url) => {
            let signer = load_signer_config()?;
            let result = verify_signed_url(&signer, &url);
            match &result {
                Ok(outcome) => println!("{outcome}"),
                Err(e) => eprintln!("{e}"),
            }
            std::process::exit(verify_exit_code(&result));
        }
    }

    init_tracing(&config.log_level)?;

    let signer = load_signer_config()?;

    info!(
        listen_addr = %config.listen_addr,
        public_scheme = %config.public_scheme,
        algorithm = %signer.algorithm(),
        digest_encoding = %signer.digest_encoding(),
        ttl_seconds = signer.ttl_seconds(),
        version = VERSION,
        "starting signurl server",
    );

    let service = build_service(&config, signer);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("SIGNURL_LISTEN is not a socket address: {}", config.listen_addr))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("signurl gate cannot bind {addr}"))?;

    info!(%addr, "signurl gate accepting signed URL requests");

    serve(listener, service, ctrl_c()).await
}
