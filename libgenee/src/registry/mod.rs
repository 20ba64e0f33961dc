//! Registry adapter.
//!
//! Binds the HTTP [`Client`] to the manifest classifier and exposes the
//! operations the search needs through [`RegistryApi`].

use crate::client::{Client, FetchedManifest};
use crate::error::Result;
use crate::manifest::{self, ManifestDescriptor, ManifestSource};
use crate::search::RegistryApi;

#[cfg(test)]
mod tests;

/// Manifest and blob access scoped to one repository.
pub struct RepositorySource<'a> {
    client: &'a Client,
    repository: &'a str,
}

impl<'a> RepositorySource<'a> {
    pub fn new(client: &'a Client, repository: &'a str) -> Self {
        Self { client, repository }
    }
}

impl ManifestSource for RepositorySource<'_> {
    fn fetch_manifest(&self, reference: &str) -> Result<FetchedManifest> {
        self.client.fetch_manifest(self.repository, reference)
    }

    fn fetch_blob(&self, digest: &str) -> Result<Vec<u8>> {
        self.client.fetch_blob(self.repository, digest)
    }
}

/// Registry operations over an authenticated client.
#[derive(Debug, Clone)]
pub struct Registry {
    client: Client,
}

impl Registry {
    /// Creates a registry over a configured client.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::client::Client;
    /// use libgenee::registry::Registry;
    ///
    /// let client = Client::new("http://localhost:5000", None).unwrap();
    /// let registry = Registry::new(client);
    /// assert_eq!(registry.client().registry_url(), "http://localhost:5000");
    /// ```
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Lists all repositories.
    pub fn list_repositories(&self) -> Result<Vec<String>> {
        self.client.fetch_catalog()
    }

    /// Lists the tags of a repository.
    pub fn list_tags(&self, repository: &str) -> Result<Vec<String>> {
        self.client.fetch_tags(repository)
    }

    /// Fetches and classifies `repository:reference`.
    pub fn describe_manifest(
        &self,
        repository: &str,
        reference: &str,
    ) -> Result<ManifestDescriptor> {
        let fetched = self.client.fetch_manifest(repository, reference)?;
        let source = RepositorySource::new(&self.client, repository);

        tracing::trace!(repository, reference, "classifying manifest");
        manifest::classify(
            &fetched.bytes,
            fetched.media_type.as_deref(),
            fetched.digest,
            &source,
        )
    }
}

impl RegistryApi for Registry {
    fn catalog(&self) -> Result<Vec<String>> {
        self.list_repositories()
    }

    fn tags(&self, repository: &str) -> Result<Vec<String>> {
        self.list_tags(repository)
    }

    fn describe(&self, repository: &str, reference: &str) -> Result<ManifestDescriptor> {
        self.describe_manifest(repository, reference)
    }
}
