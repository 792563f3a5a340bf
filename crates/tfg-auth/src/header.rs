//! Parsing of the TFG `Authorization` header.
//!
//! The header has the format:
//!
//! ```text
//! TFG signature="<base64>", client="<id>", timestamp="<epoch-seconds>"[, user_id="<id>"][, <key>="<value>"...]
//! ```
//!
//! Parameters are only split at quote-terminated boundaries: a `"` followed by
//! `,`, `;` or whitespace, then any further whitespace. Commas inside a quoted
//! value are therefore safe, while unquoted values swallow everything up to the
//! next quote-terminated boundary.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt::Write as _;

use crate::error::MalformedHeader;

/// The authentication scheme prefix, including the separating space.
pub const SCHEME_PREFIX: &str = "TFG ";

/// Reserved attribute carrying the request signature.
pub const SIGNATURE: &str = "signature";
/// Attribute naming the client whose secret signs the request.
pub const CLIENT: &str = "client";
/// Attribute carrying the request timestamp in epoch seconds.
pub const TIMESTAMP: &str = "timestamp";
/// Optional attribute naming the end user the client acts for.
pub const USER_ID: &str = "user_id";

/// Named attributes from a TFG header, with the signature removed.
///
/// Keys are case-sensitive and unique. Iteration order is the key order, which
/// keeps serialization deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    /// Create an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an attribute by exact name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The `client` attribute.
    #[must_use]
    pub fn client(&self) -> Option<&str> {
        self.get(CLIENT)
    }

    /// The `timestamp` attribute, unparsed.
    #[must_use]
    pub fn timestamp(&self) -> Option<&str> {
        self.get(TIMESTAMP)
    }

    /// The `user_id` attribute.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.get(USER_ID)
    }

    /// Insert an attribute, replacing any previous value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        // Later pairs overwrite earlier ones: last occurrence wins.
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Attributes {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The result of parsing a TFG `Authorization` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedHeader {
    /// The `signature` parameter, if present.
    pub signature: Option<String>,
    /// All other parameters.
    pub attributes: Attributes,
}

impl ParsedHeader {
    /// Whether the request presented no TFG credentials at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signature.is_none() && self.attributes.is_empty()
    }
}

/// Parse an `Authorization` header value.
///
/// An absent header, or one that does not start with `"TFG "`, yields an empty
/// [`ParsedHeader`]: no credentials were presented, which is not an error.
///
/// # Errors
///
/// Returns [`MalformedHeader`] when the header uses the TFG scheme but a
/// parameter has no `=` or nothing after it.
///
/// # Examples
///
/// ```
/// use tfg_auth::header::parse_authorization_header;
///
/// let parsed = parse_authorization_header(Some(r#"TFG signature="abc", foo="bar""#)).unwrap();
/// assert_eq!(parsed.signature.as_deref(), Some("abc"));
/// assert_eq!(parsed.attributes.get("foo"), Some("bar"));
/// assert!(parsed.attributes.get("signature").is_none());
/// ```
pub fn parse_authorization_header(header: Option<&str>) -> Result<ParsedHeader, MalformedHeader> {
    let Some(params) = header.and_then(|h| h.strip_prefix(SCHEME_PREFIX)) else {
        return Ok(ParsedHeader::default());
    };

    let mut attributes = split_params(params)
        .into_iter()
        .map(parse_param)
        .collect::<Result<Attributes, _>>()?;

    let signature = attributes.remove(SIGNATURE);
    Ok(ParsedHeader {
        signature,
        attributes,
    })
}

/// Format an `Authorization` header value the parser accepts.
///
/// The signature comes first, followed by the attributes in key order. Values
/// are always quoted; a value containing `"` followed by a separator cannot be
/// represented.
///
/// # Examples
///
/// ```
/// use tfg_auth::header::{Attributes, format_authorization_header};
///
/// let attrs: Attributes = [("client", "fake"), ("timestamp", "1371211200")].into_iter().collect();
/// assert_eq!(
///     format_authorization_header("c2ln", &attrs),
///     r#"TFG signature="c2ln", client="fake", timestamp="1371211200""#,
/// );
/// ```
#[must_use]
pub fn format_authorization_header(signature: &str, attributes: &Attributes) -> String {
    let mut header = format!("{SCHEME_PREFIX}{SIGNATURE}=\"{signature}\"");
    for (key, value) in attributes.iter().filter(|(k, _)| *k != SIGNATURE) {
        write!(header, ", {key}=\"{value}\"").expect("writing to a String cannot fail");
    }
    header
}

/// Whitespace as matched by `\s` in the header grammar.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

fn is_separator(c: char) -> bool {
    c == ',' || c == ';' || is_space(c)
}

/// Split the parameter list at `"` + separator + optional whitespace.
///
/// The closing quote and the separator are consumed by the split. Trailing
/// empty segments are dropped.
fn split_params(params: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut chars = params.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch != '"' {
            continue;
        }
        if !chars.peek().is_some_and(|&(_, next)| is_separator(next)) {
            continue;
        }
        segments.push(&params[start..idx]);
        chars.next();
        while chars.next_if(|&(_, c)| is_space(c)).is_some() {}
        start = chars.peek().map_or(params.len(), |&(i, _)| i);
    }
    segments.push(&params[start..]);

    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}

/// Parse a single `key=value` segment, unquoting the value.
fn parse_param(segment: &str) -> Result<(String, String), MalformedHeader> {
    let segment = segment.trim_matches(is_space);
    if segment.is_empty() {
        return Err(MalformedHeader::EmptySegment);
    }

    let (key, value) = segment
        .split_once('=')
        .ok_or_else(|| MalformedHeader::MissingSeparator(segment.to_owned()))?;
    if value.is_empty() {
        return Err(MalformedHeader::MissingValue(segment.to_owned()));
    }

    // One trailing quote, then one leading and one trailing quote.
    let value = value.strip_suffix('"').unwrap_or(value);
    let value = value.strip_prefix('"').unwrap_or(value);
    let value = value.strip_suffix('"').unwrap_or(value);

    Ok((key.to_owned(), value.to_owned()))
}
