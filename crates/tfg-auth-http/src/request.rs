//! Buffered HTTP request exposing [`RequestFacts`].

use std::io;

use bytes::Bytes;
use http_body_util::Full;
use tfg_auth::RequestFacts;

/// An HTTP request whose body has been collected into memory.
///
/// The body behaves like a stream with a read position: [`RequestFacts::read_body`]
/// consumes it and [`RequestFacts::reset_body_position`] rewinds it. The request
/// handed downstream by [`BufferedRequest::into_request`] starts at the current
/// position, so a verifier that forgets to rewind would starve the handler.
#[derive(Debug)]
pub struct BufferedRequest {
    parts: http::request::Parts,
    body: Bytes,
    position: usize,
    url: String,
}

impl BufferedRequest {
    /// Wrap request parts and a collected body.
    ///
    /// `default_scheme` is used to rebuild the absolute URL when the request
    /// URI is in origin form (`/path?query`).
    #[must_use]
    pub fn new(parts: http::request::Parts, body: Bytes, default_scheme: &str) -> Self {
        let url = request_url(&parts, default_scheme);
        Self {
            parts,
            body,
            position: 0,
            url,
        }
    }

    /// The request head.
    #[must_use]
    pub fn parts(&self) -> &http::request::Parts {
        &self.parts
    }

    /// Rebuild the request for the downstream service.
    #[must_use]
    pub fn into_request(self) -> http::Request<Full<Bytes>> {
        let body = self.body.slice(self.position..);
        http::Request::from_parts(self.parts, Full::new(body))
    }
}

impl RequestFacts for BufferedRequest {
    fn method(&self) -> &str {
        self.parts.method.as_str()
    }

    fn url_without_query(&self) -> &str {
        &self.url
    }

    fn read_body(&mut self) -> io::Result<Bytes> {
        let rest = self.body.slice(self.position..);
        self.position = self.body.len();
        Ok(rest)
    }

    fn reset_body_position(&mut self) {
        self.position = 0;
    }
}

/// Reconstruct `scheme://host[:port]/path` for a request, without the query.
///
/// The scheme and authority come from the URI when it is absolute, otherwise
/// from `default_scheme` and the `Host` header. Default ports are omitted.
fn request_url(parts: &http::request::Parts, default_scheme: &str) -> String {
    let scheme = parts.uri.scheme_str().unwrap_or(default_scheme);
    let authority = parts
        .uri
        .authority()
        .map(http::uri::Authority::as_str)
        .or_else(|| {
            parts
                .headers
                .get(http::header::HOST)
                .and_then(|v| v.to_str().ok())
        })
        .unwrap_or("");
    let host = strip_default_port(authority, scheme);

    format!("{scheme}://{host}{}", parts.uri.path())
}

fn strip_default_port<'a>(authority: &'a str, scheme: &str) -> &'a str {
    let default_port = match scheme {
        "http" => ":80",
        "https" => ":443",
        _ => return authority,
    };
    authority.strip_suffix(default_port).unwrap_or(authority)
}
