//! TFG shared-secret HMAC request authentication.
//!
//! Requests carry a custom `Authorization` header:
//!
//! ```text
//! Authorization: TFG signature="<base64>", client="<id>", timestamp="<epoch-seconds>"[, user_id="<id>"]
//! ```
//!
//! The signature is `Base64(HMAC-SHA256(ClientSecret, StringToSign))` where the
//! string to sign joins the method, `client`, `timestamp`, `user_id`, the URL
//! without query string, and the raw body with newlines. Requests whose
//! timestamp is four hours or more away from the verifier's clock are rejected.
//!
//! This crate is transport agnostic: the HTTP integration lives in
//! `tfg-auth-http`.
//!
//! # Usage
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use tfg_auth::client::RequestSigner;
//! use tfg_auth::freshness::FixedClock;
//! use tfg_auth::request::SeekableRequest;
//! use tfg_auth::{Authenticator, DefaultVerifier, StaticSecretStore};
//!
//! let now = 1_371_211_200;
//! let auth = Authenticator::new(
//!     DefaultVerifier::new(StaticSecretStore::new([("fake_client", "my-shared-secret")]))
//!         .with_clock(FixedClock(now)),
//! );
//!
//! let url = "http://example.org/signature/test.json";
//! let header = RequestSigner::new("fake_client", "my-shared-secret").authorization("GET", url, b"", now);
//!
//! let mut request = SeekableRequest::new("GET", url, Cursor::new(Vec::new()));
//! assert!(auth.decide(Some(&header), &mut request).is_allowed());
//! ```
//!
//! # Modules
//!
//! - [`header`] - `Authorization` header parsing and formatting
//! - [`canonical`] - String-to-sign construction
//! - [`signer`] - HMAC-SHA256 signing and constant-time verification
//! - [`freshness`] - Timestamp window checks and clocks
//! - [`credentials`] - Client secret lookup
//! - [`request`] - Request facts and scoped body reads
//! - [`verifier`] - The decision engine
//! - [`client`] - Client-side header generation
//! - [`error`] - Header parsing errors

pub mod canonical;
pub mod client;
pub mod credentials;
pub mod error;
pub mod freshness;
pub mod header;
pub mod request;
pub mod signer;
pub mod verifier;

pub use credentials::{ClientSecret, SecretStore, StaticSecretStore};
pub use error::MalformedHeader;
pub use header::{Attributes, ParsedHeader, parse_authorization_header};
pub use request::RequestFacts;
pub use verifier::{
    Authenticator, DefaultVerifier, DenyReason, PredicateVerifier, Rejection, Verdict, Verifier,
};
