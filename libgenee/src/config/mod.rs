//! Application configuration.
//!
//! Defaults are layered under an optional YAML file with the `config` crate.
//! Every key is optional in the file.
//!
//! ```yaml
//! registry: docker.genee.cn
//! output:
//!   format: pretty
//!   color: auto
//! network:
//!   timeout: 30
//! credentials:
//!   helpers: [docker-credential-desktop]
//!   docker_config: [/home/me/.docker/config.json]
//!   legacy_file: /home/me/.docker-genee/credentials.json
//! search:
//!   limit: 100
//! ```

use crate::error::{GeneeError, Result};
use config::{Config as ConfigRs, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};


/// Registry used when nothing else is configured.
pub const DEFAULT_REGISTRY: &str = "docker.genee.cn";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_registry")]
    pub registry: String,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            output: Output::default(),
            network: Network::default(),
            credentials: CredentialsConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

fn default_registry() -> String {
    DEFAULT_REGISTRY.to_string()
}

impl Config {
    /// Parses a `Config` from a YAML string layered over the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::config::Config;
    ///
    /// let config = Config::from_yaml_str("network:\n  timeout: 5\n").unwrap();
    /// assert_eq!(config.network.timeout, 5);
    /// assert_eq!(config.registry, "docker.genee.cn");
    /// ```
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = Self::defaults_builder()?.add_source(File::from_str(s, FileFormat::Yaml));
        Self::from_builder(builder, None)
    }

    /// Loads a `Config`, layering the file at `path` over the defaults.
    ///
    /// A given path must exist. Without a path the defaults are returned.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Self::defaults_builder()?;
        if let Some(p) = path {
            tracing::debug!(path = %p.display(), "loading configuration file");
            builder = builder.add_source(File::from(p).format(FileFormat::Yaml).required(true));
        }
        Self::from_builder(builder, path)
    }

    fn defaults_builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = ConfigRs::try_from(&Config::default()).map_err(|e| {
            GeneeError::config_with_source("Failed to build default configuration", None, e)
        })?;
        Ok(ConfigRs::builder().add_source(defaults))
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: Option<&Path>,
    ) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                GeneeError::config_with_source(
                    "Failed to deserialize configuration",
                    path.and_then(Path::to_str),
                    e,
                )
            })
    }
}

/// Output formatting settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Output {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub color: ColorChoice,
}

/// Enum for output formats.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,

    Json,

    Yaml,
}

/// Enum for color output choices.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,

    Always,

    Never,
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Timeout in seconds shared by every request
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}

/// Where credentials are looked up, in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialsConfig {
    /// Credential helper programs
    #[serde(default = "default_helpers")]
    pub helpers: Vec<String>,

    /// Docker config documents; the first one receives new logins
    #[serde(default = "default_docker_config")]
    pub docker_config: Vec<PathBuf>,

    /// Read-only credentials file from earlier releases
    #[serde(default = "default_legacy_file")]
    pub legacy_file: Option<PathBuf>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            helpers: default_helpers(),
            docker_config: default_docker_config(),
            legacy_file: default_legacy_file(),
        }
    }
}

fn default_helpers() -> Vec<String> {
    [
        "docker-credential-helper",
        "docker-credential-desktop",
        "docker-credential-ecr-login",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_docker_config() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".docker").join("config.json"));
    }
    paths.push(PathBuf::from("/etc/docker/config.json"));
    paths
}

fn default_legacy_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".docker-genee").join("credentials.json"))
}

/// Search settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum number of repositories a search inspects
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_search_limit(),
        }
    }
}

fn default_search_limit() -> usize {
    100
}
