//! Representative tag selection.
//!
//! [`select_tag`] picks the one tag that stands for a repository. The
//! cascade, in order:
//!
//! 0. with a platform filter, keep only tags whose platform set matches it;
//!    when none survive the repository has no matching tag
//! 1. a tag named exactly `latest` wins immediately
//! 2. otherwise the tags with the newest creation time form a partition
//! 3. within that partition the first multi-platform tag wins, else the first
//! 4. without any parseable creation time the first tag wins
//!
//! Registry tag order is only used to break ties; it never stands in for
//! recency.

use crate::error::{GeneeError, Result};
use crate::manifest::{CREATED_FORMAT, ManifestDescriptor, PlatformId};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[cfg(test)]
mod tests;

/// Case-insensitive substring filter over `os/architecture`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformFilter(String);

impl PlatformFilter {
    /// Returns `None` for an absent or blank filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::rank::PlatformFilter;
    ///
    /// assert!(PlatformFilter::parse(Some("arm64")).is_some());
    /// assert!(PlatformFilter::parse(Some("  ")).is_none());
    /// assert!(PlatformFilter::parse(None).is_none());
    /// ```
    pub fn parse(filter: Option<&str>) -> Option<Self> {
        filter
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(|f| Self(f.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when any platform in the set matches.
    pub fn matches(&self, platforms: &[PlatformId]) -> bool {
        platforms.iter().any(|p| p.matches_filter(&self.0))
    }
}

/// Supplies the manifest of a tag.
pub trait ManifestLookup {
    fn lookup(&mut self, tag: &str) -> Result<ManifestDescriptor>;
}

impl<F> ManifestLookup for F
where
    F: FnMut(&str) -> Result<ManifestDescriptor>,
{
    fn lookup(&mut self, tag: &str) -> Result<ManifestDescriptor> {
        self(tag)
    }
}

/// The tag chosen for a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionResult {
    pub tag: String,
    pub platforms: Vec<PlatformId>,
    pub manifest: ManifestDescriptor,
}

/// Looks each tag up at most once, failures included.
struct Memo<'a> {
    lookup: &'a mut dyn ManifestLookup,
    found: HashMap<String, ManifestDescriptor>,
    failed: HashSet<String>,
}

impl<'a> Memo<'a> {
    fn new(lookup: &'a mut dyn ManifestLookup) -> Self {
        Self {
            lookup,
            found: HashMap::new(),
            failed: HashSet::new(),
        }
    }

    fn get(&mut self, repository: &str, tag: &str) -> Option<&ManifestDescriptor> {
        if !self.found.contains_key(tag) && !self.failed.contains(tag) {
            match self.lookup.lookup(tag) {
                Ok(descriptor) => {
                    self.found.insert(tag.to_string(), descriptor);
                }
                Err(e) => {
                    tracing::debug!(repository, tag, error = %e, "manifest lookup failed");
                    self.failed.insert(tag.to_string());
                }
            }
        }
        self.found.get(tag)
    }

    /// The selected tag survives a failed lookup with an empty descriptor.
    fn select(mut self, repository: &str, tag: &str) -> SelectionResult {
        self.get(repository, tag);
        let manifest = self.found.remove(tag).unwrap_or_default();
        SelectionResult {
            tag: tag.to_string(),
            platforms: manifest.platforms.clone(),
            manifest,
        }
    }
}

fn parse_created(descriptor: &ManifestDescriptor) -> Option<NaiveDateTime> {
    descriptor
        .created
        .as_deref()
        .and_then(|created| NaiveDateTime::parse_from_str(created, CREATED_FORMAT).ok())
}

/// Picks the representative tag of `repository`.
///
/// # Errors
///
/// [`GeneeError::NoMatchingTag`] when `tags` is empty or the platform filter
/// eliminates every tag. A selected tag whose manifest cannot be fetched is
/// still returned, with an empty [`ManifestDescriptor`].
pub fn select_tag(
    repository: &str,
    tags: &[String],
    filter: Option<&PlatformFilter>,
    lookup: &mut dyn ManifestLookup,
) -> Result<SelectionResult> {
    let mut memo = Memo::new(lookup);

    let candidates: Vec<&str> = match filter {
        Some(filter) => tags
            .iter()
            .map(String::as_str)
            .filter(|tag| {
                memo.get(repository, tag)
                    .is_some_and(|descriptor| filter.matches(&descriptor.platforms))
            })
            .collect(),
        None => tags.iter().map(String::as_str).collect(),
    };

    let Some(&first) = candidates.first() else {
        return Err(GeneeError::no_matching_tag(repository));
    };

    if candidates.contains(&"latest") {
        return Ok(memo.select(repository, "latest"));
    }

    let dated: Vec<(&str, NaiveDateTime)> = candidates
        .iter()
        .filter_map(|&tag| {
            memo.get(repository, tag)
                .and_then(parse_created)
                .map(|created| (tag, created))
        })
        .collect();

    let Some(newest) = dated.iter().map(|(_, created)| *created).max() else {
        tracing::debug!(repository, tag = first, "no parseable creation time, using first tag");
        return Ok(memo.select(repository, first));
    };

    let partition: Vec<&str> = dated
        .iter()
        .filter(|(_, created)| *created == newest)
        .map(|(tag, _)| *tag)
        .collect();

    let chosen = if partition.len() == 1 {
        partition[0]
    } else {
        partition
            .iter()
            .copied()
            .find(|tag| {
                memo.get(repository, tag)
                    .is_some_and(ManifestDescriptor::is_multi_platform)
            })
            .unwrap_or(partition[0])
    };

    Ok(memo.select(repository, chosen))
}
