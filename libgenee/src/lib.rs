//! Genee - Private Registry Browser Library
//!
//! libgenee browses a private container-image registry: it resolves
//! credentials from a chain of sources, lists repositories and tags, picks a
//! representative tag per repository and reports the platforms each image
//! supports. Repository and tag names can be searched with `*` wildcards.
//!
//! # Quick Start
//!
//! ```no_run
//! use libgenee::Genee;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let genee = Genee::connect("docker.genee.cn")?;
//!
//!     // One row per repository, newest tag first
//!     for image in genee.list_images(Some("arm64"))? {
//!         println!("{}:{} {:?}", image.repository, image.tag, image.platforms);
//!     }
//!
//!     // Every 8.x tag of the php repositories
//!     let results = genee.search("php:8*", None, Some(20))?;
//!     println!("{} matches", results.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Main Types
//!
//! - [`Genee`] - Session for one registry
//! - [`GeneeBuilder`] - Builder for advanced configuration
//! - [`ImageRecord`] - One resolved `repository:tag` row
//! - [`Credentials`] - Basic authentication credentials
//! - [`ManifestDescriptor`] - Platforms, size and creation time of a manifest
//!
//! The lower-level modules stay public for callers that need to compose the
//! pieces differently, for example with their own [`auth::CredentialStore`].

#![warn(clippy::all)]

/// Returns the libgenee crate version.
///
/// # Examples
///
/// ```
/// let version = libgenee::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

mod genee;
pub use genee::{Genee, GeneeBuilder};

pub use auth::Credentials;
pub use config::Config;
pub use digest::Digest;
pub use error::{GeneeError, Result};
pub use manifest::{ManifestDescriptor, PlatformId};
pub use pattern::Query;
pub use rank::PlatformFilter;
pub use search::ImageRecord;

#[doc(hidden)]
pub mod auth;
#[doc(hidden)]
pub mod client;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod digest;
#[doc(hidden)]
pub mod error;
#[doc(hidden)]
pub mod format;
#[doc(hidden)]
pub mod manifest;
#[doc(hidden)]
pub mod pattern;
#[doc(hidden)]
pub mod rank;
#[doc(hidden)]
pub mod registry;
#[doc(hidden)]
pub mod search;
