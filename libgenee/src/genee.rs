//! High-level API for the genee library.
//!
//! [`Genee`] is the session object for one registry. It owns the credential
//! chain and the client settings, resolves credentials when an operation
//! needs them and hands a freshly built [`Registry`] to the catalog search.
//!
//! # Examples
//!
//! ```no_run
//! use libgenee::Genee;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let genee = Genee::connect("docker.genee.cn")?;
//!
//!     for record in genee.search("genee/*:8*", Some("amd64"), None)? {
//!         println!("{}:{}", record.repository, record.tag);
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::auth::{CredentialChain, Credentials, registry_host};
use crate::client::{Client, ClientConfig, RegistryVersion};
use crate::config::Config;
use crate::error::{GeneeError, Result};
use crate::rank::PlatformFilter;
use crate::registry::Registry;
use crate::search::{CatalogSearch, ImageRecord};

#[cfg(test)]
#[path = "genee_tests.rs"]
mod tests;

/// Session for one registry.
///
/// Credentials are resolved again for every operation; nothing is cached
/// between calls.
///
/// # Examples
///
/// ```no_run
/// use libgenee::Genee;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let genee = Genee::builder()
///         .registry("registry.internal:5000")
///         .timeout(10)
///         .build()?;
///
///     if !genee.has_valid_credentials() {
///         genee.login("alice", "s3cret")?;
///     }
///
///     let images = genee.list_images(None)?;
///     println!("Found {} images", images.len());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Genee {
    registry: String,
    host: String,
    chain: CredentialChain,
    client_config: ClientConfig,
    search_limit: usize,
}

impl Genee {
    /// Connects to a registry with the default configuration.
    pub fn connect(registry: &str) -> Result<Self> {
        Self::builder().registry(registry).build()
    }

    /// Creates a builder for advanced configuration.
    pub fn builder() -> GeneeBuilder {
        GeneeBuilder::new()
    }

    /// The registry address as configured.
    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// The `host[:port]` credentials are looked up under.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Repository limit used when a search does not give one.
    pub fn default_limit(&self) -> usize {
        self.search_limit
    }

    /// Names of the credential stores, in lookup order.
    pub fn credential_sources(&self) -> Vec<String> {
        self.chain.store_names()
    }

    /// Resolves credentials for the registry host.
    pub fn resolve_credentials(&self) -> Result<Credentials> {
        self.chain.resolve(&self.host)
    }

    /// Reports whether any credential store has credentials for the host.
    pub fn has_valid_credentials(&self) -> bool {
        self.resolve_credentials().is_ok()
    }

    /// Verifies credentials against `GET /v2/` and stores them.
    ///
    /// Returns the name of the store that took the credentials. Nothing is
    /// stored when the probe fails.
    ///
    /// # Errors
    ///
    /// A failed probe is reported as [`GeneeError::Authentication`].
    pub fn login(&self, username: &str, secret: &str) -> Result<String> {
        let credentials = Credentials::new(username, secret);
        if !credentials.is_complete() {
            return Err(GeneeError::validation("Username and password are required"));
        }

        let client = self.client(Some(credentials.clone()))?;
        client.check_version().map_err(|e| match e {
            GeneeError::Authentication { .. } => e,
            other => GeneeError::authentication(format!("Login failed: {}", other), None),
        })?;

        tracing::info!(host = self.host.as_str(), "login probe accepted");
        self.chain.persist(&self.host, &credentials)
    }

    /// Probes `GET /v2/` with the resolved credentials.
    pub fn check(&self) -> Result<RegistryVersion> {
        self.authenticated_registry()?.client().check_version()
    }

    /// Lists every repository with its representative tag.
    pub fn list_images(&self, platform: Option<&str>) -> Result<Vec<ImageRecord>> {
        self.list_images_with_progress(platform, |_, _| {})
    }

    /// Same as [`Genee::list_images`], reporting `(done, total)` after each
    /// repository.
    pub fn list_images_with_progress(
        &self,
        platform: Option<&str>,
        progress: impl FnMut(usize, usize),
    ) -> Result<Vec<ImageRecord>> {
        let registry = self.authenticated_registry()?;
        let filter = PlatformFilter::parse(platform);
        CatalogSearch::new(&registry)
            .with_progress(progress)
            .list_all(filter.as_ref())
    }

    /// Searches repositories (and tags, after a colon) with a wildcard query.
    ///
    /// At most `limit` matching repositories are inspected; `None` uses the
    /// configured default.
    pub fn search(
        &self,
        query: &str,
        platform: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<ImageRecord>> {
        self.search_with_progress(query, platform, limit, |_, _| {})
    }

    /// Same as [`Genee::search`], reporting `(done, total)` after each
    /// repository.
    pub fn search_with_progress(
        &self,
        query: &str,
        platform: Option<&str>,
        limit: Option<usize>,
        progress: impl FnMut(usize, usize),
    ) -> Result<Vec<ImageRecord>> {
        let registry = self.authenticated_registry()?;
        let filter = PlatformFilter::parse(platform);
        let limit = limit.unwrap_or(self.search_limit);
        CatalogSearch::new(&registry)
            .with_progress(progress)
            .search(query, filter.as_ref(), limit)
    }

    fn authenticated_registry(&self) -> Result<Registry> {
        let credentials = self.resolve_credentials()?;
        Ok(Registry::new(self.client(Some(credentials))?))
    }

    fn client(&self, credentials: Option<Credentials>) -> Result<Client> {
        Client::with_config(&self.registry, self.client_config.clone(), credentials)
    }
}

/// Builder for a [`Genee`] session.
#[derive(Debug, Default)]
pub struct GeneeBuilder {
    config: Option<Config>,
    registry: Option<String>,
    timeout: Option<u64>,
    chain: Option<CredentialChain>,
}

impl GeneeBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `config` for every setting not given explicitly.
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the registry address.
    pub fn registry(mut self, registry: &str) -> Self {
        self.registry = Some(registry.to_string());
        self
    }

    /// Sets the request timeout in seconds.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Replaces the credential chain built from the configuration.
    pub fn credential_chain(mut self, chain: CredentialChain) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Builds the session.
    pub fn build(self) -> Result<Genee> {
        let config = self.config.unwrap_or_default();
        let registry = self.registry.unwrap_or(config.registry);
        if registry.trim().is_empty() {
            return Err(GeneeError::validation("Registry address is required"));
        }

        let timeout = self.timeout.unwrap_or(config.network.timeout);
        let chain = self
            .chain
            .unwrap_or_else(|| CredentialChain::from_config(&config.credentials));
        let host = registry_host(&registry);

        tracing::debug!(registry = registry.as_str(), host = host.as_str(), timeout, "session ready");

        Ok(Genee {
            registry,
            host,
            chain,
            client_config: ClientConfig::new().with_timeout(timeout),
            search_limit: config.search.limit,
        })
    }
}
