//! The endpoint served behind the authentication middleware.
//!
//! It answers every authenticated request with a JSON summary of who called
//! and what was sent, which is enough to smoke-test clients.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::service::Service;
use tfg_auth::Attributes;

/// Hyper service wrapping [`whoami`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WhoamiHandler;

impl Service<http::Request<Full<Bytes>>> for WhoamiHandler {
    type Response = http::Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Full<Bytes>>) -> Self::Future {
        Box::pin(whoami(req))
    }
}

/// Respond with the authenticated identity and request summary.
pub async fn whoami(
    req: http::Request<Full<Bytes>>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let attributes = parts.extensions.get::<Attributes>();
    let body = body.collect().await?.to_bytes();

    let summary = serde_json::json!({
        "client": attributes.and_then(Attributes::client),
        "user_id": attributes.and_then(Attributes::user_id),
        "method": parts.method.as_str(),
        "path": parts.uri.path(),
        "body_bytes": body.len(),
    });

    let mut response = http::Response::new(Full::new(Bytes::from(summary.to_string())));
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    Ok(response)
}
