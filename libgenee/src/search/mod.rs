//! Catalog search and listing.
//!
//! [`CatalogSearch`] walks the registry catalog through a [`RegistryApi`],
//! filters repositories with a compiled [`Query`] and resolves each surviving
//! repository to one or more [`ImageRecord`]s.
//!
//! Only the catalog request can fail the whole walk. Any error while resolving
//! one repository (tag listing, manifest lookups, filters that leave nothing)
//! skips that repository, and a failed manifest lookup in tag-pattern mode
//! skips that tag. A 401/403 on a single repository is treated the same way.

use crate::error::{GeneeError, Result};
use crate::manifest::{ManifestDescriptor, PlatformId};
use crate::pattern::{Query, TagPattern};
use crate::rank::{PlatformFilter, SelectionResult, select_tag};
use serde::Serialize;


/// Registry operations the search needs.
pub trait RegistryApi {
    /// All repository names.
    fn catalog(&self) -> Result<Vec<String>>;
    /// Tags of a repository, in registry order.
    fn tags(&self, repository: &str) -> Result<Vec<String>>;
    /// Classified manifest of `repository:reference`.
    fn describe(&self, repository: &str, reference: &str) -> Result<ManifestDescriptor>;
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRecord {
    pub repository: String,
    pub tag: String,
    pub digest: Option<String>,
    pub platforms: Vec<PlatformId>,
    pub size: u64,
    pub created: Option<String>,
}

impl ImageRecord {
    pub fn new(repository: &str, tag: &str, manifest: ManifestDescriptor) -> Self {
        Self {
            repository: repository.to_string(),
            tag: tag.to_string(),
            digest: manifest.digest,
            platforms: manifest.platforms,
            size: manifest.size,
            created: manifest.created,
        }
    }

    fn from_selection(repository: &str, selection: SelectionResult) -> Self {
        Self::new(repository, &selection.tag, selection.manifest)
    }
}

type ProgressFn<'a> = Box<dyn FnMut(usize, usize) + 'a>;

/// Search and listing over one registry.
pub struct CatalogSearch<'a> {
    api: &'a dyn RegistryApi,
    progress: Option<ProgressFn<'a>>,
}

impl<'a> CatalogSearch<'a> {
    pub fn new(api: &'a dyn RegistryApi) -> Self {
        Self {
            api,
            progress: None,
        }
    }

    /// Calls `progress(done, total)` after each repository.
    pub fn with_progress(mut self, progress: impl FnMut(usize, usize) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Searches repository (and optionally tag) names.
    ///
    /// Repositories are filtered by name and truncated to `limit` before any
    /// tag or platform work happens. Without a tag pattern each repository
    /// yields its representative tag; with one, every matching tag yields its
    /// own record.
    pub fn search(
        &mut self,
        query: &str,
        platform: Option<&PlatformFilter>,
        limit: usize,
    ) -> Result<Vec<ImageRecord>> {
        let query = Query::parse(query);
        let tag_pattern = query.tag.as_ref().filter(|pattern| !pattern.is_empty());

        let repositories: Vec<String> = self
            .api
            .catalog()?
            .into_iter()
            .filter(|repository| query.repository.matches(repository))
            .take(limit)
            .collect();

        tracing::debug!(matched = repositories.len(), limit, "repositories selected");

        self.walk(&repositories, |api, repository| match tag_pattern {
            Some(pattern) => matching_tags(api, repository, pattern, platform),
            None => representative(api, repository, platform).map(|record| vec![record]),
        })
    }

    /// Lists every repository with its representative tag.
    pub fn list_all(&mut self, platform: Option<&PlatformFilter>) -> Result<Vec<ImageRecord>> {
        let repositories = self.api.catalog()?;
        self.walk(&repositories, |api, repository| {
            representative(api, repository, platform).map(|record| vec![record])
        })
    }

    fn walk<F>(&mut self, repositories: &[String], mut resolve: F) -> Result<Vec<ImageRecord>>
    where
        F: FnMut(&dyn RegistryApi, &str) -> Result<Vec<ImageRecord>>,
    {
        let total = repositories.len();
        let mut records = Vec::new();

        for (index, repository) in repositories.iter().enumerate() {
            match resolve(self.api, repository) {
                Ok(found) => records.extend(found),
                Err(e) => {
                    tracing::debug!(repository = repository.as_str(), error = %e, "skipping repository");
                }
            }
            if let Some(progress) = self.progress.as_mut() {
                progress(index + 1, total);
            }
        }

        Ok(records)
    }
}

fn representative(
    api: &dyn RegistryApi,
    repository: &str,
    platform: Option<&PlatformFilter>,
) -> Result<ImageRecord> {
    let tags = api.tags(repository)?;
    let mut lookup = |tag: &str| api.describe(repository, tag);
    let selection = select_tag(repository, &tags, platform, &mut lookup)?;
    Ok(ImageRecord::from_selection(repository, selection))
}

fn matching_tags(
    api: &dyn RegistryApi,
    repository: &str,
    pattern: &TagPattern,
    platform: Option<&PlatformFilter>,
) -> Result<Vec<ImageRecord>> {
    let mut records = Vec::new();

    for tag in api
        .tags(repository)?
        .iter()
        .filter(|tag| pattern.matches(tag))
    {
        let manifest = match api.describe(repository, tag) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::debug!(repository, tag = tag.as_str(), error = %e, "skipping tag");
                continue;
            }
        };
        if platform.is_some_and(|filter| !filter.matches(&manifest.platforms)) {
            continue;
        }
        records.push(ImageRecord::new(repository, tag, manifest));
    }

    if records.is_empty() {
        return Err(GeneeError::no_matching_tag(repository));
    }
    Ok(records)
}
