//! Error types for libgenee
//!
//! Every fallible operation in the crate returns [`GeneeError`].

use thiserror::Error;


/// Main error type for libgenee operations
#[derive(Error, Debug)]
pub enum GeneeError {
    /// Network-related errors (connection, timeout, DNS, unexpected status)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication errors (401, 403, rejected login probe)
    #[error("Authentication error (status: {status_code:?}): {message}")]
    Authentication {
        message: String,
        status_code: Option<u16>,
    },

    /// Resource not found errors (404)
    #[error("{resource_type} not found: {name}")]
    NotFound { resource_type: String, name: String },

    /// Server errors (5xx)
    #[error("Server error (status: {status_code}): {message}")]
    Server { message: String, status_code: u16 },

    /// Validation errors (malformed manifest, digest mismatch, etc.)
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration and local file errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An external credential helper could not be run or answered badly
    #[error("Credential helper '{helper}' failed: {message}")]
    CredentialHelper { helper: String, message: String },

    /// No credential source produced credentials for the host
    #[error("No credentials found for {host}; run 'docker genee login' first")]
    CredentialsNotFound { host: String },

    /// Tag or platform filters eliminated every tag of a repository
    #[error("No matching tag in repository {repository}")]
    NoMatchingTag { repository: String },
}

/// Result type alias for libgenee operations
pub type Result<T> = std::result::Result<T, GeneeError>;

impl GeneeError {
    /// Creates a new network error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::error::GeneeError;
    ///
    /// let err = GeneeError::network("connection refused");
    /// assert!(matches!(err, GeneeError::Network { .. }));
    /// ```
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new network error with a source error.
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new authentication error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::error::GeneeError;
    ///
    /// let err = GeneeError::authentication("invalid credentials", Some(401));
    /// assert!(matches!(err, GeneeError::Authentication { .. }));
    /// ```
    pub fn authentication<S: Into<String>>(message: S, status_code: Option<u16>) -> Self {
        Self::Authentication {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new not found error.
    pub fn not_found<S: Into<String>>(resource_type: S, name: S) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Creates a new server error.
    pub fn server<S: Into<String>>(message: S, status_code: u16) -> Self {
        Self::Server {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::error::GeneeError;
    ///
    /// let err = GeneeError::validation("invalid manifest format");
    /// assert!(matches!(err, GeneeError::Validation { .. }));
    /// ```
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new validation error with a source error.
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S, path: Option<S>) -> Self {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::error::GeneeError;
    /// use std::io;
    ///
    /// let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    /// let err = GeneeError::config_with_source("failed to read", Some("/etc/docker/config.json"), io_err);
    /// assert!(matches!(err, GeneeError::Config { .. }));
    /// ```
    pub fn config_with_source<S, E>(message: S, path: Option<S>, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new credential helper error.
    pub fn credential_helper<S: Into<String>>(helper: S, message: S) -> Self {
        Self::CredentialHelper {
            helper: helper.into(),
            message: message.into(),
        }
    }

    /// Creates a new credentials-not-found error.
    pub fn credentials_not_found<S: Into<String>>(host: S) -> Self {
        Self::CredentialsNotFound { host: host.into() }
    }

    /// Creates a new no-matching-tag error.
    pub fn no_matching_tag<S: Into<String>>(repository: S) -> Self {
        Self::NoMatchingTag {
            repository: repository.into(),
        }
    }
}
