//! Error types for TFG header parsing.

/// An `Authorization` header that uses the `TFG` scheme but whose parameter
/// list cannot be parsed.
///
/// Each variant carries the offending parameter segment for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedHeader {
    /// Two separators with nothing between them.
    #[error("empty parameter in Authorization header")]
    EmptySegment,

    /// A parameter without a `=` separator (e.g. `TFG foobar`).
    #[error("parameter `{0}` has no `=` separator")]
    MissingSeparator(String),

    /// A parameter with nothing after the `=` separator.
    #[error("parameter `{0}` has no value")]
    MissingValue(String),
}
