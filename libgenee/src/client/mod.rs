//! HTTP client for registry communication.
//!
//! A thin blocking client built on reqwest that speaks the Registry HTTP API
//! v2. Every request carries Basic authentication when credentials were
//! supplied at construction. Nothing is retried.

use crate::auth::Credentials;
use crate::digest::Digest;
use crate::error::{GeneeError, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;


/// Media types requested when fetching manifests, multi-platform first.
pub const MANIFEST_ACCEPT: &str = "application/vnd.docker.distribution.manifest.list.v2+json, \
     application/vnd.oci.image.index.v1+json, \
     application/vnd.docker.distribution.manifest.v2+json, \
     application/vnd.oci.image.manifest.v1+json";

/// Response from the catalog API endpoint.
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    repositories: Option<Vec<String>>,
}

/// Response from the tags list API endpoint.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    name: String,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Version information returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryVersion {
    /// The Docker-Distribution-API-Version header value, if present.
    pub api_version: Option<String>,
}

/// A manifest document as returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedManifest {
    /// Raw manifest bytes
    pub bytes: Vec<u8>,
    /// Docker-Content-Digest header, absent when the registry omits it
    pub digest: Option<String>,
    /// Content-Type header, used as a media type hint
    pub media_type: Option<String>,
}

/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use libgenee::client::ClientConfig;
///
/// let config = ClientConfig::new().with_timeout(60);
/// assert_eq!(config.timeout_seconds, 60);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds, shared by every call (default: 30)
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// Blocking HTTP client for one registry.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: HttpClient,
    registry_url: String,
    credentials: Option<Credentials>,
    timeout_seconds: u64,
}

impl Client {
    /// Creates a client with the default configuration.
    ///
    /// A registry address without a scheme is reached over `https://`.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::client::Client;
    ///
    /// let client = Client::new("docker.genee.cn", None).unwrap();
    /// assert_eq!(client.registry_url(), "https://docker.genee.cn");
    /// ```
    pub fn new(registry_url: &str, credentials: Option<Credentials>) -> Result<Self> {
        Self::with_config(registry_url, ClientConfig::default(), credentials)
    }

    /// Creates a client with a custom configuration.
    pub fn with_config(
        registry_url: &str,
        config: ClientConfig,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let registry_url = Self::normalize_url(registry_url)?;

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GeneeError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            registry_url,
            credentials,
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// Ensures the URL has a scheme and no trailing slashes.
    fn normalize_url(url: &str) -> Result<String> {
        let url = url.trim();
        if url.is_empty() {
            return Err(GeneeError::validation("Registry URL cannot be empty"));
        }

        let url = if !url.starts_with("http://") && !url.starts_with("https://") {
            format!("https://{}", url)
        } else {
            url.to_string()
        };

        Ok(url.trim_end_matches('/').to_string())
    }

    /// Returns the base registry URL.
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// Returns the credentials attached to every request, if any.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self.http_client.get(url);
        match &self.credentials {
            Some(creds) => request.header(reqwest::header::AUTHORIZATION, creds.to_header_value()),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .map_err(|e| self.translate_reqwest_error(e))?;
        Self::check_response_status(response)
    }

    /// Probes `GET /v2/` with the client's credentials.
    ///
    /// Used both to confirm the registry speaks API v2 and to validate
    /// credentials during login.
    pub fn check_version(&self) -> Result<RegistryVersion> {
        let url = format!("{}/v2/", self.registry_url);
        let response = self.send(self.get(&url))?;

        let api_version = response
            .headers()
            .get("Docker-Distribution-API-Version")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Ok(RegistryVersion { api_version })
    }

    /// Fetches the repository catalog with a single request.
    pub fn fetch_catalog(&self) -> Result<Vec<String>> {
        let url = format!("{}/v2/_catalog", self.registry_url);
        let response = self.send(self.get(&url))?;

        let catalog: CatalogResponse = response.json().map_err(|e| {
            GeneeError::validation_with_source("Failed to parse catalog response", e)
        })?;

        Ok(catalog.repositories.unwrap_or_default())
    }

    /// Fetches the tags of a repository in registry order.
    pub fn fetch_tags(&self, repository: &str) -> Result<Vec<String>> {
        let url = format!("{}/v2/{}/tags/list", self.registry_url, repository);
        let response = self.send(self.get(&url))?;

        let tags: TagsResponse = response.json().map_err(|e| {
            GeneeError::validation_with_source("Failed to parse tags response", e)
        })?;

        if tags.name != repository {
            return Err(GeneeError::validation(format!(
                "Registry returned tags for '{}' but expected '{}'",
                tags.name, repository
            )));
        }

        Ok(tags.tags.unwrap_or_default())
    }

    /// Fetches a manifest by tag or digest.
    ///
    /// The digest comes from the `Docker-Content-Digest` header and is left
    /// empty when the registry omits it.
    pub fn fetch_manifest(&self, repository: &str, reference: &str) -> Result<FetchedManifest> {
        let url = format!(
            "{}/v2/{}/manifests/{}",
            self.registry_url, repository, reference
        );
        let response = self.send(
            self.get(&url)
                .header(reqwest::header::ACCEPT, MANIFEST_ACCEPT),
        )?;

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        };
        let digest = header("Docker-Content-Digest");
        let media_type = header("Content-Type");

        let bytes = response.bytes().map_err(|e| {
            GeneeError::network_with_source("Failed to read manifest response", e)
        })?;

        Ok(FetchedManifest {
            bytes: bytes.to_vec(),
            digest,
            media_type,
        })
    }

    /// Fetches a blob and verifies it against its digest.
    pub fn fetch_blob(&self, repository: &str, digest: &str) -> Result<Vec<u8>> {
        let expected = Digest::from_str(digest)?;

        let url = format!("{}/v2/{}/blobs/{}", self.registry_url, repository, digest);
        let response = self.send(self.get(&url))?;

        let bytes = response
            .bytes()
            .map_err(|e| GeneeError::network_with_source("Failed to read blob response", e))?;

        expected.verify(&bytes)?;
        Ok(bytes.to_vec())
    }

    fn translate_reqwest_error(&self, error: reqwest::Error) -> GeneeError {
        if error.is_timeout() {
            GeneeError::network(format!(
                "Request to {} timed out after {} seconds",
                self.registry_url, self.timeout_seconds
            ))
        } else if error.is_connect() {
            GeneeError::network_with_source(
                format!("Failed to connect to registry at {}", self.registry_url),
                error,
            )
        } else {
            GeneeError::network_with_source(
                format!("Network error communicating with {}", self.registry_url),
                error,
            )
        }
    }

    /// Maps non-success statuses onto error kinds.
    fn check_response_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response
            .text()
            .unwrap_or_else(|_| String::from("(unable to read response body)"));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GeneeError::authentication(
                format!("Access denied for {}: {}", url, body.trim()),
                Some(status.as_u16()),
            )),
            StatusCode::NOT_FOUND => Err(GeneeError::not_found("resource", url.as_str())),
            s if s.is_server_error() => Err(GeneeError::server(
                format!("Server error from {}: {}", url, body.trim()),
                s.as_u16(),
            )),
            s => Err(GeneeError::network(format!(
                "HTTP {} from {}: {}",
                s.as_u16(),
                url,
                body.trim()
            ))),
        }
    }
}
