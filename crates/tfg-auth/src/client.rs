//! Client-side request signing.

use crate::canonical::build_string_to_sign;
use crate::credentials::ClientSecret;
use crate::header::{Attributes, CLIENT, TIMESTAMP, USER_ID, format_authorization_header};
use crate::signer::HmacSigner;

/// Produces `Authorization` headers for one client.
///
/// # Examples
///
/// ```
/// use tfg_auth::client::RequestSigner;
///
/// let signer = RequestSigner::new("fake_client", "my-shared-secret");
/// let header = signer.authorization("GET", "http://example.org/signature/test.json", b"", 1_371_211_200);
/// assert!(header.contains(r#"signature="EDs81ljsXNbd3xKDGwdAfFvdN0tCV5NLDYQIZHEshLU=""#));
/// ```
#[derive(Debug, Clone)]
pub struct RequestSigner {
    client: String,
    secret: ClientSecret,
    user_id: Option<String>,
    signer: HmacSigner,
}

impl RequestSigner {
    /// Create a signer for `client` using its shared `secret`.
    pub fn new(client: impl Into<String>, secret: impl Into<ClientSecret>) -> Self {
        Self {
            client: client.into(),
            secret: secret.into(),
            user_id: None,
            signer: HmacSigner::new(),
        }
    }

    /// Sign requests on behalf of an end user.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// The attributes sent for a request made at `timestamp`.
    #[must_use]
    pub fn attributes(&self, timestamp: i64) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert(CLIENT, self.client.as_str());
        attrs.insert(TIMESTAMP, timestamp.to_string());
        if let Some(user_id) = &self.user_id {
            attrs.insert(USER_ID, user_id.as_str());
        }
        attrs
    }

    /// The signature for a request made at `timestamp`.
    #[must_use]
    pub fn signature(&self, method: &str, url: &str, body: &[u8], timestamp: i64) -> String {
        let string_to_sign = build_string_to_sign(method, &self.attributes(timestamp), url, body);
        self.signer.sign(self.secret.expose(), &string_to_sign)
    }

    /// A complete `Authorization` header value for a request made at
    /// `timestamp` (epoch seconds). Any query string in `url` is ignored.
    #[must_use]
    pub fn authorization(&self, method: &str, url: &str, body: &[u8], timestamp: i64) -> String {
        let signature = self.signature(method, url, body, timestamp);
        format_authorization_header(&signature, &self.attributes(timestamp))
    }
}
