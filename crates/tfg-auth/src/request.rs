//! Request facts required by the verifier.
//!
//! The verifier needs the method, the URL without its query string, and the
//! raw body. The body is read as a stream and must be left readable from the
//! start for whatever handles the request next; [`read_body_rewound`] enforces
//! that on every exit path.

use std::io::{self, Read, Seek, SeekFrom};

use bytes::Bytes;

use crate::canonical::strip_query;

/// Access to the parts of a request covered by the signature.
pub trait RequestFacts {
    /// The HTTP method as sent.
    fn method(&self) -> &str;

    /// The absolute request URL with the query string removed.
    fn url_without_query(&self) -> &str;

    /// Read the body from the current position to the end.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the underlying body cannot be read.
    fn read_body(&mut self) -> io::Result<Bytes>;

    /// Move the body back to its start so it can be read again.
    fn reset_body_position(&mut self);
}

/// Resets the body position when dropped.
struct Rewind<'a> {
    request: &'a mut dyn RequestFacts,
}

impl Drop for Rewind<'_> {
    fn drop(&mut self) {
        self.request.reset_body_position();
    }
}

/// Read the whole body, then reset its position, whether or not the read
/// succeeded.
///
/// # Errors
///
/// Propagates the error from [`RequestFacts::read_body`].
pub fn read_body_rewound(request: &mut dyn RequestFacts) -> io::Result<Bytes> {
    let guard = Rewind { request };
    guard.request.read_body()
}

/// A [`RequestFacts`] implementation over any seekable body stream.
///
/// # Examples
///
/// ```
/// use std::io::{Cursor, Read};
///
/// use tfg_auth::request::{RequestFacts, SeekableRequest, read_body_rewound};
///
/// let mut req = SeekableRequest::new("POST", "http://example.org/a?x=1", Cursor::new(b"data".to_vec()));
/// assert_eq!(req.url_without_query(), "http://example.org/a");
/// assert_eq!(&read_body_rewound(&mut req).unwrap()[..], b"data");
///
/// let mut rest = String::new();
/// req.into_body().read_to_string(&mut rest).unwrap();
/// assert_eq!(rest, "data");
/// ```
#[derive(Debug)]
pub struct SeekableRequest<R> {
    method: String,
    url: String,
    body: R,
}

impl<R: Read + Seek> SeekableRequest<R> {
    /// Create request facts; any query string on `url` is dropped.
    pub fn new(method: impl Into<String>, url: &str, body: R) -> Self {
        Self {
            method: method.into(),
            url: strip_query(url).to_owned(),
            body,
        }
    }

    /// Give back the body stream.
    pub fn into_body(self) -> R {
        self.body
    }
}

impl<R: Read + Seek> RequestFacts for SeekableRequest<R> {
    fn method(&self) -> &str {
        &self.method
    }

    fn url_without_query(&self) -> &str {
        &self.url
    }

    fn read_body(&mut self) -> io::Result<Bytes> {
        let mut buf = Vec::new();
        self.body.read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    fn reset_body_position(&mut self) {
        if let Err(e) = self.body.seek(SeekFrom::Start(0)) {
            tracing::warn!(error = %e, "failed to rewind request body");
        }
    }
}
