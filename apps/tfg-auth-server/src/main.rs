//! TFG Auth Server - HTTP gateway enforcing TFG request authentication.
//!
//! Every request except the health probe must carry a valid
//! `Authorization: TFG ...` header. Authenticated requests reach a small
//! echo endpoint that reports the calling client.
//!
//! # Usage
//!
//! ```text
//! TFG_CLIENT_SECRETS=my_client=my-shared-secret tfg-auth-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TFG_LISTEN` | `0.0.0.0:8080` | Bind address |
//! | `TFG_CLIENT_SECRETS` | *(empty)* | Comma-separated `client=secret` pairs |
//! | `TFG_FRESHNESS_WINDOW_SECS` | `14400` | Accepted timestamp skew in seconds |
//! | `TFG_DEFAULT_SCHEME` | `http` | Scheme of the signed URL (`http` or `https`) |
//! | `TFG_MAX_BODY_BYTES` | `16777216` | Largest request body accepted |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod config;
mod gateway;
mod handler;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tfg_auth::{Authenticator, DefaultVerifier};
use tfg_auth_http::{TfgAuthHttpConfig, TfgAuthService};

use crate::config::ServerConfig;
use crate::gateway::GatewayService;
use crate::handler::WhoamiHandler;

/// Server version logged at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the [`TfgAuthHttpConfig`] from the application [`ServerConfig`].
fn build_http_config(config: &ServerConfig) -> TfgAuthHttpConfig {
    TfgAuthHttpConfig {
        default_scheme: config.default_scheme.clone(),
        max_body_bytes: config.max_body_bytes,
        ..TfgAuthHttpConfig::default()
    }
}

/// Build the authenticator from the configured client secrets.
fn build_authenticator(config: &ServerConfig) -> Authenticator {
    Authenticator::new(
        DefaultVerifier::new(config.client_secrets.clone())
            .with_freshness_window(config.freshness_window),
    )
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(
    listener: TcpListener,
    service: GatewayService<TfgAuthService<WhoamiHandler>>,
) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Perform a health check by connecting to the gateway and requesting the health endpoint.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.starts_with("HTTP/1.1 200") && response.contains("\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

/// Address the health check connects to for a given bind address.
fn health_check_addr(listen: &str) -> String {
    listen.replace("0.0.0.0", "127.0.0.1")
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?;

    // Handle --health-check flag for container HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let healthy = run_health_check(&health_check_addr(&config.listen))
            .await
            .is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;

    if config.client_secrets.is_empty() {
        warn!("TFG_CLIENT_SECRETS is empty, every request will be rejected");
    }

    let authenticated = TfgAuthService::new(
        WhoamiHandler,
        build_authenticator(&config),
        build_http_config(&config),
    );
    let gateway = GatewayService::new(authenticated);

    let addr: SocketAddr = config
        .listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        %addr,
        clients = ?config.client_secrets.clients().collect::<Vec<_>>(),
        freshness_window = config.freshness_window,
        default_scheme = %config.default_scheme,
        version = VERSION,
        "starting TFG Auth Server",
    );

    serve(listener, gateway).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_build_http_config_from_server_config() {
        let config = ServerConfig {
            default_scheme: "https".to_owned(),
            max_body_bytes: 1024,
            ..ServerConfig::default()
        };
        let http_config = build_http_config(&config);
        assert_eq!(http_config.default_scheme, "https");
        assert_eq!(http_config.max_body_bytes, 1024);
    }

    #[test]
    fn test_should_rewrite_wildcard_address_for_health_check() {
        assert_eq!(health_check_addr("0.0.0.0:8080"), "127.0.0.1:8080");
        assert_eq!(health_check_addr("10.0.0.5:9000"), "10.0.0.5:9000");
    }
}
