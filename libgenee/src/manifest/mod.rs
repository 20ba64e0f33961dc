//! Manifest classification.
//!
//! Turns a raw manifest document into a [`ManifestDescriptor`]: the platform
//! set, the total size and the creation time of the image it describes.
//!
//! Three families are recognized by media type:
//!
//! - multi-platform indexes (OCI image index, Docker manifest list): platforms
//!   come from the child entries; size and creation time come from the first
//!   child only.
//! - single-platform manifests (OCI image manifest, Docker manifest v2):
//!   platform from `config.platform`, size from config plus layers.
//! - anything else: best effort through `config.os`/`config.architecture` and
//!   the configuration blob.
//!
//! No platform is ever guessed. When the registry provides nothing usable the
//! platform set is empty.

use crate::client::FetchedManifest;
use crate::error::{GeneeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;


pub const OCI_INDEX: &str = "application/vnd.oci.image.index.v1+json";
pub const DOCKER_MANIFEST_LIST: &str = "application/vnd.docker.distribution.manifest.list.v2+json";
pub const OCI_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
pub const DOCKER_MANIFEST: &str = "application/vnd.docker.distribution.manifest.v2+json";

/// Layout of creation timestamps handed to the ranker and the renderer.
pub const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Manifest family, decided by media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// Multi-platform image index or manifest list
    Index,
    /// Single-platform image manifest
    Image,
    /// Unrecognized or absent media type
    Unknown,
}

impl ManifestKind {
    /// Classifies a media type, ignoring any `;` parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::manifest::ManifestKind;
    ///
    /// assert_eq!(
    ///     ManifestKind::from_media_type("application/vnd.oci.image.index.v1+json"),
    ///     ManifestKind::Index
    /// );
    /// assert_eq!(ManifestKind::from_media_type("text/plain"), ManifestKind::Unknown);
    /// ```
    pub fn from_media_type(media_type: &str) -> Self {
        let essence = media_type.split(';').next().unwrap_or("").trim();
        match essence {
            OCI_INDEX | DOCKER_MANIFEST_LIST => Self::Index,
            OCI_MANIFEST | DOCKER_MANIFEST => Self::Image,
            _ => Self::Unknown,
        }
    }
}

/// An `os/architecture` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformId {
    pub os: String,
    pub architecture: String,
}

impl PlatformId {
    pub fn new(os: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            architecture: architecture.into(),
        }
    }

    /// Case-insensitive substring match of `filter` against `os/architecture`.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::manifest::PlatformId;
    ///
    /// let platform = PlatformId::new("linux", "arm64");
    /// assert!(platform.matches_filter("ARM"));
    /// assert!(platform.matches_filter("linux/arm64"));
    /// assert!(!platform.matches_filter("amd64"));
    /// ```
    pub fn matches_filter(&self, filter: &str) -> bool {
        self.to_string()
            .to_lowercase()
            .contains(&filter.to_lowercase())
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.architecture)
    }
}

/// What the classifier learned about one manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManifestDescriptor {
    /// Registry-assigned digest, absent when the registry omits it
    pub digest: Option<String>,
    /// Config plus layer sizes; for an index, those of the first child only
    pub size: u64,
    /// Creation time formatted with [`CREATED_FORMAT`]
    pub created: Option<String>,
    /// Supported platforms, in document order without duplicates
    pub platforms: Vec<PlatformId>,
}

impl ManifestDescriptor {
    pub fn is_multi_platform(&self) -> bool {
        self.platforms.len() > 1
    }
}

/// Where the classifier fetches child manifests and configuration blobs.
///
/// Implementations are bound to one repository.
pub trait ManifestSource {
    fn fetch_manifest(&self, reference: &str) -> Result<FetchedManifest>;
    fn fetch_blob(&self, digest: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Default, Deserialize)]
struct RawPlatform {
    os: Option<String>,
    architecture: Option<String>,
}

impl RawPlatform {
    fn to_platform(&self) -> Option<PlatformId> {
        match (&self.os, &self.architecture) {
            (Some(os), Some(arch)) if !os.is_empty() && !arch.is_empty() => {
                Some(PlatformId::new(os, arch))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawDescriptor {
    digest: Option<String>,
    size: Option<u64>,
    platform: Option<RawPlatform>,
    os: Option<String>,
    architecture: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(rename = "mediaType")]
    media_type: Option<String>,
    manifests: Option<Vec<RawDescriptor>>,
    config: Option<RawDescriptor>,
    layers: Option<Vec<RawDescriptor>>,
}

impl RawManifest {
    fn parse(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw)
            .map_err(|e| GeneeError::validation_with_source("Failed to parse manifest", e))
    }

    fn total_size(&self) -> u64 {
        let config = self.config.as_ref().and_then(|c| c.size).unwrap_or(0);
        // Sizes are registry-supplied; clamp instead of overflowing.
        self.layers
            .iter()
            .flatten()
            .filter_map(|layer| layer.size)
            .fold(config, u64::saturating_add)
    }

    fn config_digest(&self) -> Option<&str> {
        self.config.as_ref().and_then(|c| c.digest.as_deref())
    }
}

/// The parts of an image configuration blob the classifier reads.
#[derive(Debug, Default, Deserialize)]
struct RawImageConfig {
    os: Option<String>,
    architecture: Option<String>,
    created: Option<String>,
}

/// Normalizes an RFC 3339 timestamp to [`CREATED_FORMAT`] in UTC.
///
/// # Examples
///
/// ```
/// use libgenee::manifest::normalize_created;
///
/// assert_eq!(
///     normalize_created("2024-03-01T08:15:30.123456789+08:00").as_deref(),
///     Some("2024-03-01 00:15:30")
/// );
/// assert_eq!(normalize_created("yesterday"), None);
/// ```
pub fn normalize_created(value: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc).format(CREATED_FORMAT).to_string())
}

fn push_unique(platforms: &mut Vec<PlatformId>, platform: PlatformId) {
    if !platforms.contains(&platform) {
        platforms.push(platform);
    }
}

fn load_image_config(source: &dyn ManifestSource, digest: Option<&str>) -> Option<RawImageConfig> {
    let digest = digest?;
    match source.fetch_blob(digest) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::debug!(digest, error = %e, "unreadable image configuration");
                None
            }
        },
        Err(e) => {
            tracing::debug!(digest, error = %e, "could not fetch image configuration");
            None
        }
    }
}

/// Classifies a raw manifest document.
///
/// The document's own `mediaType` wins over `media_type_hint` (usually the
/// response `Content-Type`). Child manifests and configuration blobs are
/// fetched from `source`; their failures only cost size, timestamp or
/// platform data, never the classification itself.
///
/// # Errors
///
/// Returns a validation error when `raw` is not a JSON manifest.
pub fn classify(
    raw: &[u8],
    media_type_hint: Option<&str>,
    digest: Option<String>,
    source: &dyn ManifestSource,
) -> Result<ManifestDescriptor> {
    let manifest = RawManifest::parse(raw)?;

    let kind = manifest
        .media_type
        .as_deref()
        .or(media_type_hint)
        .map(ManifestKind::from_media_type)
        .unwrap_or(ManifestKind::Unknown);

    let mut descriptor = match kind {
        ManifestKind::Index => classify_index(&manifest, source),
        ManifestKind::Image => classify_single(&manifest, true, source),
        ManifestKind::Unknown => classify_single(&manifest, false, source),
    };
    descriptor.digest = digest;
    Ok(descriptor)
}

fn classify_index(manifest: &RawManifest, source: &dyn ManifestSource) -> ManifestDescriptor {
    let entries = manifest.manifests.as_deref().unwrap_or(&[]);

    let mut platforms = Vec::new();
    for platform in entries
        .iter()
        .filter_map(|entry| entry.platform.as_ref())
        .filter_map(RawPlatform::to_platform)
        .filter(|p| p.os != "unknown" && p.architecture != "unknown")
    {
        push_unique(&mut platforms, platform);
    }

    let mut descriptor = ManifestDescriptor {
        platforms,
        ..Default::default()
    };

    // Size and creation time describe the first child only.
    let Some(child_digest) = entries.first().and_then(|entry| entry.digest.as_deref()) else {
        return descriptor;
    };

    let child = source
        .fetch_manifest(child_digest)
        .and_then(|fetched| RawManifest::parse(&fetched.bytes));
    match child {
        Ok(child) => {
            descriptor.size = child.total_size();
            descriptor.created = load_image_config(source, child.config_digest())
                .and_then(|config| config.created)
                .and_then(|created| normalize_created(&created));
        }
        Err(e) => {
            tracing::debug!(digest = child_digest, error = %e, "could not size first child manifest");
        }
    }

    descriptor
}

fn classify_single(
    manifest: &RawManifest,
    use_declared_platform: bool,
    source: &dyn ManifestSource,
) -> ManifestDescriptor {
    let config = manifest.config.as_ref();
    let image_config = load_image_config(source, manifest.config_digest());

    let declared = config
        .filter(|_| use_declared_platform)
        .and_then(|c| c.platform.as_ref())
        .and_then(RawPlatform::to_platform);
    let inline = config.and_then(|c| {
        RawPlatform {
            os: c.os.clone(),
            architecture: c.architecture.clone(),
        }
        .to_platform()
    });
    let from_blob = image_config.as_ref().and_then(|blob| {
        RawPlatform {
            os: blob.os.clone(),
            architecture: blob.architecture.clone(),
        }
        .to_platform()
    });

    ManifestDescriptor {
        digest: None,
        size: manifest.total_size(),
        created: image_config
            .and_then(|blob| blob.created)
            .and_then(|created| normalize_created(&created)),
        platforms: declared.or(inline).or(from_blob).into_iter().collect(),
    }
}
