//! hyper middleware enforcing TFG request authentication.
//!
//! [`TfgAuthService`] wraps any hyper service. Each request's header is
//! screened with a [`tfg_auth::Authenticator`]; requests that pass have their
//! body buffered and verified, and are then either forwarded to
//! the inner service (with its body intact and the authenticated
//! [`tfg_auth::Attributes`] in the request extensions) or answered with a
//! rejection:
//!
//! | Verdict | Default response |
//! |---------|------------------|
//! | malformed `TFG` header | `400` "Unprocessable Authorization header" |
//! | any denial | `401` "Unauthorized" |
//! | body over `max_body_bytes` (after screening) | `413` "Request body too large" |
//!
//! Rejection responses are pluggable through [`RejectionHandler`].

pub mod request;
pub mod response;
pub mod service;

pub use request::BufferedRequest;
pub use response::{DefaultRejectionHandler, RejectionHandler};
pub use service::{TfgAuthBody, TfgAuthHttpConfig, TfgAuthService};
