//! Timestamp freshness checks.
//!
//! A request is fresh when its claimed timestamp lies strictly within the
//! freshness window of the verifier's clock, in either direction.

/// Default freshness window: four hours, in seconds.
pub const DEFAULT_FRESHNESS_WINDOW: i64 = 4 * 3600;

/// Source of the current time in epoch seconds.
pub trait Clock: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Parse a timestamp attribute permissively.
///
/// Leading whitespace is skipped, then an optional sign and the leading run of
/// decimal digits (single `_` between digits allowed) are read. Anything that
/// does not start with a number parses as `0` instead of failing, which keeps
/// compatibility with existing clients. Out-of-range values saturate.
///
/// # Examples
///
/// ```
/// use tfg_auth::freshness::parse_timestamp;
///
/// assert_eq!(parse_timestamp("1371211200"), 1_371_211_200);
/// assert_eq!(parse_timestamp("  42abc"), 42);
/// assert_eq!(parse_timestamp("abc"), 0);
/// ```
#[must_use]
pub fn parse_timestamp(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let bytes = digits.as_bytes();
    let mut value: i64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_digit() {
            let digit = i64::from(b - b'0');
            value = value.saturating_mul(10).saturating_add(digit);
        } else if b == b'_' && i > 0 && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
            // digit separator
        } else {
            break;
        }
        i += 1;
    }

    if negative { -value } else { value }
}

/// Whether `timestamp` is within the default window of `now`.
///
/// # Examples
///
/// ```
/// use tfg_auth::freshness::is_fresh;
///
/// let now = 1_371_211_200;
/// assert!(is_fresh(&(now - 14_399).to_string(), now));
/// assert!(!is_fresh(&(now - 14_400).to_string(), now));
/// ```
#[must_use]
pub fn is_fresh(timestamp: &str, now: i64) -> bool {
    is_fresh_within(timestamp, now, DEFAULT_FRESHNESS_WINDOW)
}

/// Whether `timestamp` is strictly less than `window` seconds away from `now`.
#[must_use]
pub fn is_fresh_within(timestamp: &str, now: i64, window: i64) -> bool {
    let claimed = parse_timestamp(timestamp);
    now.abs_diff(claimed) < window.unsigned_abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_371_211_200;

    #[test]
    fn test_should_accept_just_inside_window() {
        assert!(is_fresh(&(NOW - 14_399).to_string(), NOW));
        assert!(is_fresh(&(NOW + 14_399).to_string(), NOW));
        assert!(is_fresh(&NOW.to_string(), NOW));
    }

    #[test]
    fn test_should_reject_at_window_boundary() {
        assert!(!is_fresh(&(NOW - 14_400).to_string(), NOW));
        assert!(!is_fresh(&(NOW + 14_400).to_string(), NOW));
    }

    #[test]
    fn test_should_reject_beyond_window() {
        assert!(!is_fresh(&(NOW - 14_401).to_string(), NOW));
        assert!(!is_fresh(&(NOW + 86_400).to_string(), NOW));
    }

    #[test]
    fn test_should_treat_garbage_as_epoch_zero() {
        assert_eq!(parse_timestamp(""), 0);
        assert_eq!(parse_timestamp("not-a-number"), 0);
        assert!(!is_fresh("garbage", NOW));
        assert!(is_fresh("garbage", 100));
    }

    #[test]
    fn test_should_parse_like_integer_coercion() {
        assert_eq!(parse_timestamp(" \t1371211200"), NOW);
        assert_eq!(parse_timestamp("1371211200.5"), NOW);
        assert_eq!(parse_timestamp("+12"), 12);
        assert_eq!(parse_timestamp("-12"), -12);
        assert_eq!(parse_timestamp("1_000"), 1000);
        assert_eq!(parse_timestamp("1__0"), 1);
        assert_eq!(parse_timestamp("_1"), 0);
    }

    #[test]
    fn test_should_saturate_on_overflow() {
        assert_eq!(parse_timestamp("99999999999999999999999"), i64::MAX);
        assert!(!is_fresh("99999999999999999999999", NOW));
        assert!(!is_fresh("-99999999999999999999999", NOW));
    }

    #[test]
    fn test_should_honor_custom_window() {
        assert!(is_fresh_within(&(NOW - 59).to_string(), NOW, 60));
        assert!(!is_fresh_within(&(NOW - 60).to_string(), NOW, 60));
    }

    #[test]
    fn test_should_report_fixed_time() {
        assert_eq!(FixedClock(NOW).now(), NOW);
        assert!(SystemClock.now() > NOW);
    }
}
