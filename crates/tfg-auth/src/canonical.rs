//! String-to-sign construction for the TFG scheme.
//!
//! The string to sign is the newline-joined sequence:
//!
//! ```text
//! HTTP-Method (uppercase)
//! client
//! timestamp
//! user_id
//! URL without query string
//! raw request body
//! ```
//!
//! Absent attributes are skipped entirely rather than rendered as empty
//! lines. Client and server must agree on this exact order and omission rule.

use crate::header::Attributes;

/// Build the canonical string to sign for a request.
///
/// The body is always the final entry, so an empty body leaves a trailing
/// newline after the URL.
///
/// # Examples
///
/// ```
/// use tfg_auth::canonical::build_string_to_sign;
/// use tfg_auth::header::Attributes;
///
/// let attrs: Attributes = [("client", "fake_client"), ("timestamp", "1371211200")]
///     .into_iter()
///     .collect();
/// let sts = build_string_to_sign("get", &attrs, "http://example.org/signature/test.json", b"");
/// assert_eq!(
///     sts,
///     b"GET\nfake_client\n1371211200\nhttp://example.org/signature/test.json\n"
/// );
/// ```
#[must_use]
pub fn build_string_to_sign(
    method: &str,
    attributes: &Attributes,
    url_without_query: &str,
    body: &[u8],
) -> Vec<u8> {
    let method = method.to_ascii_uppercase();
    let lines = [
        Some(method.as_str()),
        attributes.client(),
        attributes.timestamp(),
        attributes.user_id(),
        Some(strip_query(url_without_query)),
    ];

    let mut out = Vec::with_capacity(body.len() + 128);
    for line in lines.into_iter().flatten() {
        out.extend_from_slice(line.as_bytes());
        out.push(b'\n');
    }
    out.extend_from_slice(body);
    out
}

/// Strip the query string (everything from the first `?`) from a URL.
///
/// # Examples
///
/// ```
/// use tfg_auth::canonical::strip_query;
///
/// assert_eq!(strip_query("http://example.org/a?b=c"), "http://example.org/a");
/// assert_eq!(strip_query("http://example.org/a"), "http://example.org/a");
/// ```
#[must_use]
pub fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}
