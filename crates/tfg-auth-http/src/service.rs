//! TFG authentication middleware implementing the hyper `Service` trait.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Either, Full, Limited};
use hyper::service::Service;
use tracing::{debug, warn};

use tfg_auth::{Authenticator, Rejection};

use crate::request::BufferedRequest;
use crate::response::{DefaultRejectionHandler, RejectionHandler};

/// Default cap on buffered request bodies: 16 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Configuration for the TFG authentication middleware.
#[derive(Clone)]
pub struct TfgAuthHttpConfig {
    /// Scheme used to rebuild the signed URL for origin-form request URIs.
    pub default_scheme: String,
    /// Largest request body buffered for verification.
    pub max_body_bytes: usize,
    /// Builds the responses for rejected requests.
    pub rejection_handler: Arc<dyn RejectionHandler>,
}

impl fmt::Debug for TfgAuthHttpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfgAuthHttpConfig")
            .field("default_scheme", &self.default_scheme)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("rejection_handler", &"...")
            .finish()
    }
}

impl Default for TfgAuthHttpConfig {
    fn default() -> Self {
        Self {
            default_scheme: "http".to_owned(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            rejection_handler: Arc::new(DefaultRejectionHandler),
        }
    }
}

/// Response body: the downstream body, or a buffered rejection.
pub type TfgAuthBody<B> = Either<B, Full<Bytes>>;

/// Hyper `Service` that authenticates requests before passing them on.
///
/// The `Authorization` header is screened first, so requests refused on
/// their header alone are answered without reading the body. Otherwise the
/// body is buffered so that it can be covered by the signature and still be
/// delivered to the inner service. Authenticated requests carry
/// their [`tfg_auth::Attributes`] in the request extensions.
#[derive(Debug)]
pub struct TfgAuthService<S> {
    inner: S,
    authenticator: Arc<Authenticator>,
    config: Arc<TfgAuthHttpConfig>,
}

impl<S> TfgAuthService<S> {
    /// Wrap `inner` with TFG authentication.
    pub fn new(inner: S, authenticator: Authenticator, config: TfgAuthHttpConfig) -> Self {
        Self {
            inner,
            authenticator: Arc::new(authenticator),
            config: Arc::new(config),
        }
    }
}

impl<S: Clone> Clone for TfgAuthService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            authenticator: Arc::clone(&self.authenticator),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, B, ResBody> Service<http::Request<B>> for TfgAuthService<S>
where
    S: Service<http::Request<Full<Bytes>>, Response = http::Response<ResBody>>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
    S::Error: 'static,
    ResBody: 'static,
    B: http_body::Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    type Response = http::Response<TfgAuthBody<ResBody>>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();
        let authenticator = Arc::clone(&self.authenticator);
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            let (parts, body) = req.into_parts();

            let header = parts
                .headers
                .get(http::header::AUTHORIZATION)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

            // The header alone settles most rejections; only then is the body buffered.
            let parsed = match authenticator.screen(header.as_deref()) {
                Ok(parsed) => parsed,
                Err(rejection) => {
                    let response = reject(&config, &parts, rejection);
                    return Ok(response.map(Either::Right));
                }
            };

            let body = match Limited::new(body, config.max_body_bytes).collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    warn!(
                        method = %parts.method,
                        path = parts.uri.path(),
                        error = %e,
                        "Failed to read request body"
                    );
                    let response = config.rejection_handler.unreadable_body(&parts, e.as_ref());
                    return Ok(response.map(Either::Right));
                }
            };

            let mut request = BufferedRequest::new(parts, body, &config.default_scheme);

            match authenticator.authorize(parsed, &mut request) {
                Ok(attributes) => {
                    debug!(
                        client = attributes.client(),
                        path = request.parts().uri.path(),
                        "Request authenticated"
                    );
                    let mut req = request.into_request();
                    req.extensions_mut().insert(attributes);
                    let response = inner.call(req).await?;
                    Ok(response.map(Either::Left))
                }
                Err(reason) => {
                    let response = reject(&config, request.parts(), Rejection::Deny(reason));
                    Ok(response.map(Either::Right))
                }
            }
        })
    }
}

/// Build the rejection response through the configured handler.
fn reject(
    config: &TfgAuthHttpConfig,
    parts: &http::request::Parts,
    rejection: Rejection,
) -> http::Response<Full<Bytes>> {
    match rejection {
        Rejection::Deny(reason) => {
            debug!(
                %reason,
                method = %parts.method,
                path = parts.uri.path(),
                "Rejecting unauthenticated request"
            );
            config.rejection_handler.unauthorized(parts, reason)
        }
        Rejection::Malformed(error) => config.rejection_handler.unprocessable(parts, &error),
    }
}
