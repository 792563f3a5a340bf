//! Integration tests for the TFG auth server.
//!
//! These tests require a running server at `localhost:8080` that knows the
//! test client's secret:
//!
//! ```text
//! TFG_CLIENT_SECRETS=integration=integration-secret tfg-auth-server
//! ```
//!
//! They are marked `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p tfg-auth-integration -- --ignored
//! ```

use std::sync::Once;

use tfg_auth::client::RequestSigner;

mod test_auth;
mod test_health;

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

/// Endpoint URL for the server.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("TFG_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned())
}

/// Build an absolute URL for `path` on the server.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", endpoint_url().trim_end_matches('/'))
}

/// Create an HTTP client for the server.
#[must_use]
pub fn http_client() -> reqwest::Client {
    init_tracing();
    reqwest::Client::new()
}

/// Signer for the client the server is configured with.
#[must_use]
pub fn signer() -> RequestSigner {
    let client = std::env::var("TFG_TEST_CLIENT").unwrap_or_else(|_| "integration".to_owned());
    let secret =
        std::env::var("TFG_TEST_SECRET").unwrap_or_else(|_| "integration-secret".to_owned());
    RequestSigner::new(client, secret)
}

/// Current time in epoch seconds.
#[must_use]
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Send a request signed with `signer` at `timestamp`.
pub async fn send_signed(
    client: &reqwest::Client,
    signer: &RequestSigner,
    method: reqwest::Method,
    path: &str,
    body: &'static [u8],
    timestamp: i64,
) -> anyhow::Result<reqwest::Response> {
    let target = url(path);
    let parsed = reqwest::Url::parse(&target)?;
    let mut signed_url = parsed.clone();
    signed_url.set_query(None);

    let authorization =
        signer.authorization(method.as_str(), signed_url.as_str(), body, timestamp);
    tracing::debug!(%authorization, %target, "sending signed request");

    let response = client
        .request(method, parsed)
        .header(reqwest::header::AUTHORIZATION, authorization)
        .body(body)
        .send()
        .await?;
    Ok(response)
}
