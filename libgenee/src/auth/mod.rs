//! Credential resolution for the registry.
//!
//! Identity comes from an ordered chain of [`CredentialStore`]s. Lookup walks
//! the chain and stops at the first store that produces credentials; later
//! stores are never consulted. Persisting after a login walks the writable
//! stores in the same order and stops at the first one that accepts.
//!
//! The default chain is:
//!
//! 1. external credential helper programs ([`HelperStore`])
//! 2. docker config documents ([`DockerConfigStore`])
//! 3. the legacy credentials file, read-only ([`LegacyCredentialFile`])

use crate::config::CredentialsConfig;
use crate::error::{GeneeError, Result};
use base64::{Engine as _, engine::general_purpose};
use std::fmt;

pub mod docker_config;
pub mod helper;
pub mod store;

pub use docker_config::DockerConfigStore;
pub use helper::HelperStore;
pub use store::LegacyCredentialFile;


/// Username and secret for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub secret: String,
}

impl Credentials {
    /// Creates credentials from a username and secret.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::auth::Credentials;
    ///
    /// let creds = Credentials::new("alice", "s3cret");
    /// assert_eq!(creds.username, "alice");
    /// ```
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    /// Returns true when both fields are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.secret.is_empty()
    }

    /// `user:secret`, base64 encoded.
    pub fn encoded(&self) -> String {
        general_purpose::STANDARD.encode(format!("{}:{}", self.username, self.secret))
    }

    /// Returns the Authorization header value for these credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::auth::Credentials;
    ///
    /// let creds = Credentials::new("user", "pass");
    /// assert_eq!(creds.to_header_value(), "Basic dXNlcjpwYXNz");
    /// ```
    pub fn to_header_value(&self) -> String {
        format!("Basic {}", self.encoded())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A source of registry credentials.
///
/// `get` returns `Ok(None)` when the source simply has nothing for the host
/// and `Err` when the source itself is broken; the chain treats both as a
/// miss and moves on.
pub trait CredentialStore {
    /// Short name used in logs.
    fn name(&self) -> String;

    /// Looks up credentials for a registry host.
    fn get(&self, host: &str) -> Result<Option<Credentials>>;

    /// Saves credentials for a registry host.
    fn store(&self, host: &str, credentials: &Credentials) -> Result<()> {
        let _ = (host, credentials);
        Err(GeneeError::validation(format!(
            "Credential store '{}' is read-only",
            self.name()
        )))
    }

    /// Whether [`store`](CredentialStore::store) can succeed at all.
    fn is_writable(&self) -> bool {
        false
    }
}

/// Ordered list of credential stores evaluated first-success.
pub struct CredentialChain {
    stores: Vec<Box<dyn CredentialStore>>,
}

impl fmt::Debug for CredentialChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.stores.iter().map(|s| s.name()).collect();
        f.debug_struct("CredentialChain")
            .field("stores", &names)
            .finish()
    }
}

impl CredentialChain {
    /// Creates a chain from stores in lookup order.
    pub fn new(stores: Vec<Box<dyn CredentialStore>>) -> Self {
        Self { stores }
    }

    /// Builds the default chain described by the configuration.
    pub fn from_config(config: &CredentialsConfig) -> Self {
        let mut stores: Vec<Box<dyn CredentialStore>> = Vec::new();
        for program in &config.helpers {
            stores.push(Box::new(HelperStore::new(program)));
        }
        for path in &config.docker_config {
            stores.push(Box::new(DockerConfigStore::new(path)));
        }
        if let Some(path) = &config.legacy_file {
            stores.push(Box::new(LegacyCredentialFile::new(path)));
        }
        Self::new(stores)
    }

    /// Names of the stores, in lookup order.
    pub fn store_names(&self) -> Vec<String> {
        self.stores.iter().map(|s| s.name()).collect()
    }

    /// Returns the first credentials any store produces for `host`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneeError::CredentialsNotFound`] when every store misses.
    pub fn resolve(&self, host: &str) -> Result<Credentials> {
        for store in &self.stores {
            match store.get(host) {
                Ok(Some(creds)) if creds.is_complete() => {
                    tracing::debug!(host, source = %store.name(), "resolved credentials");
                    return Ok(creds);
                }
                Ok(_) => {
                    tracing::debug!(host, source = %store.name(), "no credentials in store");
                }
                Err(e) => {
                    tracing::debug!(host, source = %store.name(), error = %e, "credential store failed");
                }
            }
        }
        Err(GeneeError::credentials_not_found(host))
    }

    /// Saves credentials in the first writable store that accepts them.
    ///
    /// Returns the name of the store that took the credentials.
    pub fn persist(&self, host: &str, credentials: &Credentials) -> Result<String> {
        let mut last_error = None;
        for store in self.stores.iter().filter(|s| s.is_writable()) {
            match store.store(host, credentials) {
                Ok(()) => {
                    tracing::info!(host, source = %store.name(), "stored credentials");
                    return Ok(store.name());
                }
                Err(e) => {
                    tracing::debug!(host, source = %store.name(), error = %e, "could not store credentials");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            GeneeError::config("No writable credential store is configured", None)
        }))
    }
}

/// Extracts the `host[:port]` key used to index credentials.
///
/// # Examples
///
/// ```
/// use libgenee::auth::registry_host;
///
/// assert_eq!(registry_host("https://docker.genee.cn/"), "docker.genee.cn");
/// assert_eq!(registry_host("localhost:5000"), "localhost:5000");
/// ```
pub fn registry_host(registry: &str) -> String {
    let trimmed = registry.trim().trim_end_matches('/');
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    match url::Url::parse(&with_scheme) {
        Ok(parsed) => match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => trimmed.to_string(),
        },
        Err(_) => trimmed.to_string(),
    }
}
