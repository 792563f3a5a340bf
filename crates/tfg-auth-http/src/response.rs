//! Rejection responses.
//!
//! The responses sent for rejected requests are policy, not part of the
//! verification. [`RejectionHandler`] provides the defaults as trait methods;
//! implementors override the ones they want to change.

use std::error::Error as StdError;

use bytes::Bytes;
use http::{HeaderValue, StatusCode};
use http_body_util::Full;
use http_body_util::LengthLimitError;
use tfg_auth::{DenyReason, MalformedHeader};

/// Body of the default `401` response.
pub const UNAUTHORIZED_BODY: &str = "Unauthorized";
/// Body of the default `400` response for a malformed header.
pub const UNPROCESSABLE_BODY: &str = "Unprocessable Authorization header";
/// Body of the default response when the request body cannot be read.
pub const UNREADABLE_BODY: &str = "Unreadable request body";
/// Body of the default `413` response.
pub const TOO_LARGE_BODY: &str = "Request body too large";

/// Builds the responses for rejected requests.
pub trait RejectionHandler: Send + Sync {
    /// Response for a denied request. Defaults to `401 Unauthorized`.
    fn unauthorized(
        &self,
        _parts: &http::request::Parts,
        _reason: DenyReason,
    ) -> http::Response<Full<Bytes>> {
        let mut response = text_response(StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY);
        response
            .headers_mut()
            .insert(http::header::WWW_AUTHENTICATE, HeaderValue::from_static("TFG"));
        response
    }

    /// Response for a malformed `Authorization` header. Defaults to
    /// `400 Bad Request` with "Unprocessable Authorization header".
    fn unprocessable(
        &self,
        _parts: &http::request::Parts,
        _error: &MalformedHeader,
    ) -> http::Response<Full<Bytes>> {
        text_response(StatusCode::BAD_REQUEST, UNPROCESSABLE_BODY)
    }

    /// Response when the request body cannot be collected. Defaults to
    /// `413 Payload Too Large` past the size limit, `400 Bad Request` otherwise.
    fn unreadable_body(
        &self,
        _parts: &http::request::Parts,
        error: &(dyn StdError + Send + Sync + 'static),
    ) -> http::Response<Full<Bytes>> {
        if error.is::<LengthLimitError>() {
            text_response(StatusCode::PAYLOAD_TOO_LARGE, TOO_LARGE_BODY)
        } else {
            text_response(StatusCode::BAD_REQUEST, UNREADABLE_BODY)
        }
    }
}

/// The stock rejection responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRejectionHandler;

impl RejectionHandler for DefaultRejectionHandler {}

/// Build a plain-text response.
#[must_use]
pub fn text_response(status: StatusCode, body: &'static str) -> http::Response<Full<Bytes>> {
    let mut response = http::Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
