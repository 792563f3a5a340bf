//! Client secret lookup.
//!
//! The [`SecretStore`] trait abstracts where shared secrets come from. The
//! [`StaticSecretStore`] is filled once at start-up and only read afterwards,
//! so it can be shared across concurrent requests without locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A shared secret used as the HMAC key for one client.
///
/// Cheap to clone. The `Debug` output never reveals the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(Arc<[u8]>);

impl ClientSecret {
    /// Wrap raw secret bytes.
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self(Arc::from(secret.as_ref()))
    }

    /// The raw secret bytes.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(..)")
    }
}

impl From<&str> for ClientSecret {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<String> for ClientSecret {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

impl From<Vec<u8>> for ClientSecret {
    fn from(secret: Vec<u8>) -> Self {
        Self(Arc::from(secret))
    }
}

/// Resolves the shared secret for a client identifier.
///
/// An unknown client is `None`, a normal outcome rather than an error.
pub trait SecretStore: Send + Sync {
    /// Look up the secret for `client`.
    fn secret_for(&self, client: &str) -> Option<ClientSecret>;
}

/// An in-memory client secret table.
///
/// # Examples
///
/// ```
/// use tfg_auth::credentials::{SecretStore, StaticSecretStore};
///
/// let store = StaticSecretStore::new([("fake_client", "my-shared-secret")]);
/// assert_eq!(store.secret_for("fake_client").unwrap().expose(), b"my-shared-secret");
/// assert!(store.secret_for("someone_else").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticSecretStore {
    secrets: HashMap<String, ClientSecret>,
}

impl StaticSecretStore {
    /// Build a store from `(client, secret)` pairs. Later duplicates win.
    pub fn new<C, S>(pairs: impl IntoIterator<Item = (C, S)>) -> Self
    where
        C: Into<String>,
        S: Into<ClientSecret>,
    {
        pairs.into_iter().collect()
    }

    /// Number of configured clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Whether no clients are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Configured client identifiers, in no particular order.
    pub fn clients(&self) -> impl Iterator<Item = &str> {
        self.secrets.keys().map(String::as_str)
    }
}

impl<C: Into<String>, S: Into<ClientSecret>> FromIterator<(C, S)> for StaticSecretStore {
    fn from_iter<I: IntoIterator<Item = (C, S)>>(iter: I) -> Self {
        Self {
            secrets: iter
                .into_iter()
                .map(|(c, s)| (c.into(), s.into()))
                .collect(),
        }
    }
}

impl SecretStore for StaticSecretStore {
    fn secret_for(&self, client: &str) -> Option<ClientSecret> {
        self.secrets.get(client).cloned()
    }
}

impl<T: SecretStore + ?Sized> SecretStore for Arc<T> {
    fn secret_for(&self, client: &str) -> Option<ClientSecret> {
        (**self).secret_for(client)
    }
}
