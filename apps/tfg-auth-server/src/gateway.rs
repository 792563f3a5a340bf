//! Gateway service placed in front of the authenticated application.
//!
//! Health-check probes (`GET /health`, `GET /_health`) are answered here
//! without authentication. Everything else goes through the TFG middleware.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::{Either, Full};
use hyper::service::Service;

use tfg_auth_http::TfgAuthBody;

/// Server version reported in health check responses.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Response body produced by the gateway.
pub type GatewayBody = TfgAuthBody<Full<Bytes>>;

/// Routes health probes locally and everything else to the authenticated service.
#[derive(Debug, Clone)]
pub struct GatewayService<S> {
    authenticated: S,
}

impl<S> GatewayService<S> {
    /// Create a gateway in front of `authenticated`.
    pub fn new(authenticated: S) -> Self {
        Self { authenticated }
    }
}

impl<S, B> Service<http::Request<B>> for GatewayService<S>
where
    S: Service<http::Request<B>, Response = http::Response<GatewayBody>, Error = Infallible>,
    S::Future: Send + 'static,
{
    type Response = http::Response<GatewayBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        if is_health_check(req.method(), req.uri().path()) {
            return Box::pin(async { Ok(health_check_response()) });
        }

        Box::pin(self.authenticated.call(req))
    }
}

/// Check if the request is a health check probe.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/health" || path == "/_health")
}

fn health_check_response() -> http::Response<GatewayBody> {
    let body = serde_json::json!({ "status": "running", "version": VERSION }).to_string();
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Either::Right(Full::new(Bytes::from(body))))
        .expect("static health response should be valid")
}
