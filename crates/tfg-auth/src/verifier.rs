//! The authentication decision engine.
//!
//! [`Authenticator::decide`] parses the `Authorization` header and hands the
//! signature and attributes to a [`Verifier`]. The [`DefaultVerifier`]
//! implements the shared-secret HMAC check:
//!
//! 1. signature, `client` and `timestamp` must be present
//! 2. the timestamp must be within the freshness window
//! 3. the client must have a known secret
//! 4. the recomputed signature must match
//!
//! Steps 1 to 3 need only the header and run in [`Verifier::precheck`], so
//! the body is read only for requests that reach the signature comparison.
//!
//! A custom [`Verifier`] (or a plain predicate via [`PredicateVerifier`])
//! replaces those steps while keeping the header parsing.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::canonical::build_string_to_sign;
use crate::credentials::{ClientSecret, SecretStore};
use crate::error::MalformedHeader;
use crate::freshness::{Clock, DEFAULT_FRESHNESS_WINDOW, SystemClock, is_fresh_within};
use crate::header::{Attributes, ParsedHeader, parse_authorization_header};
use crate::request::{RequestFacts, read_body_rewound};
use crate::signer::HmacSigner;

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// No TFG credentials were presented.
    NoCredentials,
    /// The signature, `client` or `timestamp` attribute is missing.
    MissingRequiredAttributes,
    /// The timestamp is outside the freshness window.
    StaleOrFutureTimestamp,
    /// No secret is configured for the claimed client.
    UnknownClient,
    /// The signature does not match the request.
    SignatureMismatch,
    /// The request body could not be read for signing.
    UnreadableBody,
    /// A custom verifier rejected the request.
    Rejected,
}

impl DenyReason {
    /// A stable identifier suitable for logs and metrics labels.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoCredentials => "no_credentials",
            Self::MissingRequiredAttributes => "missing_required_attributes",
            Self::StaleOrFutureTimestamp => "stale_or_future_timestamp",
            Self::UnknownClient => "unknown_client",
            Self::SignatureMismatch => "signature_mismatch",
            Self::UnreadableBody => "unreadable_body",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of authenticating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The request is authentic. Carries the header attributes without the
    /// signature.
    Allow(Attributes),
    /// The request is denied.
    Deny(DenyReason),
    /// The `Authorization` header uses the TFG scheme but cannot be parsed.
    Malformed(MalformedHeader),
}

impl Verdict {
    /// Whether the request may pass through.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// Why a request was turned away before reaching the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The request is denied.
    Deny(DenyReason),
    /// The `Authorization` header uses the TFG scheme but cannot be parsed.
    Malformed(MalformedHeader),
}

impl From<Rejection> for Verdict {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Deny(reason) => Self::Deny(reason),
            Rejection::Malformed(error) => Self::Malformed(error),
        }
    }
}

/// Decides whether parsed credentials authenticate a request.
pub trait Verifier: Send + Sync {
    /// Checks that can be made from the header alone.
    ///
    /// Runs before the request body is read, so a denial here never buffers
    /// the payload. The default accepts everything and leaves the decision to
    /// [`Verifier::verify`].
    ///
    /// # Errors
    ///
    /// Returns the [`DenyReason`] when the request can be refused outright.
    fn precheck(&self, _signature: Option<&str>, _attributes: &Attributes) -> Result<(), DenyReason> {
        Ok(())
    }

    /// Check the credentials against the request.
    ///
    /// `signature` is `None` and `attributes` empty when the request carried
    /// no TFG header at all.
    ///
    /// # Errors
    ///
    /// Returns the [`DenyReason`] when the request is not authentic.
    fn verify(
        &self,
        signature: Option<&str>,
        attributes: &Attributes,
        request: &mut dyn RequestFacts,
    ) -> Result<(), DenyReason>;
}

/// The shared-secret HMAC-SHA256 verifier.
pub struct DefaultVerifier {
    secrets: Arc<dyn SecretStore>,
    clock: Arc<dyn Clock>,
    window: i64,
    signer: HmacSigner,
}

impl fmt::Debug for DefaultVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultVerifier")
            .field("secrets", &"...")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl DefaultVerifier {
    /// Create a verifier using the wall clock and the default four-hour window.
    pub fn new(secrets: impl SecretStore + 'static) -> Self {
        Self {
            secrets: Arc::new(secrets),
            clock: Arc::new(SystemClock),
            window: DEFAULT_FRESHNESS_WINDOW,
            signer: HmacSigner::new(),
        }
    }

    /// Replace the clock used for freshness checks.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the freshness window, in seconds.
    #[must_use]
    pub fn with_freshness_window(mut self, window: i64) -> Self {
        self.window = window;
        self
    }

    /// Presence, freshness and client lookup.
    fn credentials<'a>(
        &self,
        signature: Option<&'a str>,
        attributes: &'a Attributes,
    ) -> Result<(&'a str, &'a str, ClientSecret), DenyReason> {
        if signature.is_none() && attributes.is_empty() {
            return Err(DenyReason::NoCredentials);
        }
        let (Some(signature), Some(client), Some(timestamp)) =
            (signature, attributes.client(), attributes.timestamp())
        else {
            return Err(DenyReason::MissingRequiredAttributes);
        };

        let now = self.clock.now();
        if !is_fresh_within(timestamp, now, self.window) {
            debug!(client, timestamp, now, "TFG timestamp outside freshness window");
            return Err(DenyReason::StaleOrFutureTimestamp);
        }

        let secret = self
            .secrets
            .secret_for(client)
            .ok_or(DenyReason::UnknownClient)?;
        Ok((signature, client, secret))
    }
}

impl Verifier for DefaultVerifier {
    fn precheck(&self, signature: Option<&str>, attributes: &Attributes) -> Result<(), DenyReason> {
        self.credentials(signature, attributes).map(|_| ())
    }

    fn verify(
        &self,
        signature: Option<&str>,
        attributes: &Attributes,
        request: &mut dyn RequestFacts,
    ) -> Result<(), DenyReason> {
        let (signature, client, secret) = self.credentials(signature, attributes)?;

        debug!(client, "Verifying TFG signature");

        let body = read_body_rewound(request).map_err(|e| {
            warn!(client, error = %e, "Failed to read request body for TFG verification");
            DenyReason::UnreadableBody
        })?;

        let string_to_sign = build_string_to_sign(
            request.method(),
            attributes,
            request.url_without_query(),
            &body,
        );

        if self
            .signer
            .verify(signature, secret.expose(), &string_to_sign)
        {
            debug!(client, "TFG verification succeeded");
            Ok(())
        } else {
            debug!(
                client,
                method = request.method(),
                url = request.url_without_query(),
                body_len = body.len(),
                "TFG signature mismatch"
            );
            Err(DenyReason::SignatureMismatch)
        }
    }
}

/// Adapts a boolean predicate into a [`Verifier`].
///
/// A `false` result denies the request with [`DenyReason::Rejected`].
///
/// # Examples
///
/// ```
/// use tfg_auth::request::{RequestFacts, SeekableRequest};
/// use tfg_auth::{Attributes, Authenticator, PredicateVerifier};
///
/// let auth = Authenticator::new(PredicateVerifier::new(
///     |sig: Option<&str>, _: &Attributes, _: &mut dyn RequestFacts| sig == Some("let-me-in"),
/// ));
/// let mut req = SeekableRequest::new("GET", "http://example.org/", std::io::Cursor::new(Vec::new()));
/// assert!(auth.decide(Some(r#"TFG signature="let-me-in""#), &mut req).is_allowed());
/// ```
pub struct PredicateVerifier<F> {
    predicate: F,
}

impl<F> PredicateVerifier<F>
where
    F: Fn(Option<&str>, &Attributes, &mut dyn RequestFacts) -> bool + Send + Sync,
{
    /// Wrap a predicate.
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> fmt::Debug for PredicateVerifier<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateVerifier").finish_non_exhaustive()
    }
}

impl<F> Verifier for PredicateVerifier<F>
where
    F: Fn(Option<&str>, &Attributes, &mut dyn RequestFacts) -> bool + Send + Sync,
{
    fn verify(
        &self,
        signature: Option<&str>,
        attributes: &Attributes,
        request: &mut dyn RequestFacts,
    ) -> Result<(), DenyReason> {
        if (self.predicate)(signature, attributes, request) {
            Ok(())
        } else {
            Err(DenyReason::Rejected)
        }
    }
}

/// Parses TFG headers and delegates the decision to a [`Verifier`].
///
/// The decision runs in two phases. [`Authenticator::screen`] looks only at
/// the header, and [`Authenticator::authorize`] reads the request body. Hosts
/// that stream bodies call `screen` first and collect the body only for
/// requests that pass it.
#[derive(Clone)]
pub struct Authenticator {
    verifier: Arc<dyn Verifier>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Create an authenticator around any verifier.
    pub fn new(verifier: impl Verifier + 'static) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    /// Create an authenticator using the [`DefaultVerifier`] over `secrets`.
    pub fn with_secrets(secrets: impl SecretStore + 'static) -> Self {
        Self::new(DefaultVerifier::new(secrets))
    }

    /// Decide whether a request is authentic.
    ///
    /// `header` is the raw `Authorization` header value, if any. A malformed
    /// TFG header short-circuits before the verifier runs. Never panics and
    /// never fails: every outcome is a [`Verdict`].
    pub fn decide(&self, header: Option<&str>, request: &mut dyn RequestFacts) -> Verdict {
        let parsed = match self.screen(header) {
            Ok(parsed) => parsed,
            Err(rejection) => return rejection.into(),
        };
        match self.authorize(parsed, request) {
            Ok(attributes) => Verdict::Allow(attributes),
            Err(reason) => Verdict::Deny(reason),
        }
    }

    /// Parse the header and run the verifier's body-free checks.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::Malformed`] for an unparseable TFG header and
    /// [`Rejection::Deny`] when the verifier refuses the credentials outright.
    pub fn screen(&self, header: Option<&str>) -> Result<ParsedHeader, Rejection> {
        let parsed = parse_authorization_header(header).map_err(|e| {
            warn!(error = %e, "Unprocessable TFG Authorization header");
            Rejection::Malformed(e)
        })?;

        self.verifier
            .precheck(parsed.signature.as_deref(), &parsed.attributes)
            .map_err(|reason| {
                log_denial(reason, &parsed.attributes);
                Rejection::Deny(reason)
            })?;
        Ok(parsed)
    }

    /// Run the full verification of screened credentials against the request.
    ///
    /// # Errors
    ///
    /// Returns the [`DenyReason`] when the request is not authentic.
    pub fn authorize(
        &self,
        parsed: ParsedHeader,
        request: &mut dyn RequestFacts,
    ) -> Result<Attributes, DenyReason> {
        match self
            .verifier
            .verify(parsed.signature.as_deref(), &parsed.attributes, request)
        {
            Ok(()) => Ok(parsed.attributes),
            Err(reason) => {
                log_denial(reason, &parsed.attributes);
                Err(reason)
            }
        }
    }
}

fn log_denial(reason: DenyReason, attributes: &Attributes) {
    debug!(
        reason = %reason,
        client = attributes.client(),
        "TFG authentication denied"
    );
}
