//! Wildcard query compilation.
//!
//! A query is `repository[:tag]`, split on the first colon. Both halves may
//! use `*` as a wildcard. The tag half is compiled to a [`MatchStrategy`]
//! that can be tested without any registry access.

use regex::Regex;


/// A parsed search query.
#[derive(Debug, Clone)]
pub struct Query {
    pub repository: RepositoryMatcher,
    /// Present only when the query contains a colon.
    pub tag: Option<TagPattern>,
}

impl Query {
    /// Parses a query, splitting on the first colon.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::pattern::Query;
    ///
    /// let query = Query::parse("genee/php:8*");
    /// assert!(query.repository.matches("genee/php"));
    /// assert!(query.tag.unwrap().matches("8.1-fpm"));
    ///
    /// let query = Query::parse("php");
    /// assert!(query.tag.is_none());
    /// ```
    pub fn parse(query: &str) -> Self {
        match query.split_once(':') {
            Some((repository, tag)) => Self {
                repository: RepositoryMatcher::new(repository, true),
                tag: Some(TagPattern::compile(tag)),
            },
            None => Self {
                repository: RepositoryMatcher::new(query, false),
                tag: None,
            },
        }
    }
}

/// Predicate over repository names.
#[derive(Debug, Clone)]
pub enum RepositoryMatcher {
    /// Every `*` became `.*`; unanchored search
    Wildcard(Regex),
    /// Case-insensitive containment (query had a tag part, or the wildcard
    /// regex failed to compile)
    Contains(String),
    /// Byte-exact equality
    Exact(String),
}

impl RepositoryMatcher {
    fn new(pattern: &str, has_tag_part: bool) -> Self {
        if pattern.contains('*') {
            match Regex::new(&pattern.replace('*', ".*")) {
                Ok(re) => Self::Wildcard(re),
                Err(e) => {
                    tracing::debug!(pattern, error = %e, "repository pattern degraded to substring");
                    Self::Contains(pattern.to_lowercase())
                }
            }
        } else if has_tag_part {
            Self::Contains(pattern.to_lowercase())
        } else {
            Self::Exact(pattern.to_string())
        }
    }

    pub fn matches(&self, repository: &str) -> bool {
        match self {
            Self::Wildcard(re) => re.is_match(repository),
            Self::Contains(needle) => repository.to_lowercase().contains(needle),
            Self::Exact(name) => repository == name,
        }
    }
}

/// How a tag pattern matches.
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    /// No wildcard: byte-exact equality
    Exact(String),
    /// `*X*`, or a bare `*` with an empty needle
    Contains(String),
    /// `X*`
    Prefix(String),
    /// `*X`
    Suffix(String),
    /// `X*Y`
    PrefixSuffix(String, String),
    /// Any other wildcard shape: `*` replaced by `.*`, unanchored
    NaiveWildcard(Regex),
    /// Case-insensitive containment of the raw pattern
    Substring(String),
    /// Empty pattern
    Never,
}

/// A compiled tag pattern.
#[derive(Debug, Clone)]
pub struct TagPattern {
    raw: String,
    strategy: MatchStrategy,
}

impl TagPattern {
    /// Compiles a tag pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::pattern::TagPattern;
    ///
    /// let pattern = TagPattern::compile("*-alpine");
    /// assert!(pattern.matches("22-alpine"));
    /// assert!(!pattern.matches("22-alpine-slim"));
    /// ```
    pub fn compile(pattern: &str) -> Self {
        Self {
            raw: pattern.to_string(),
            strategy: Self::strategy_for(pattern),
        }
    }

    fn strategy_for(pattern: &str) -> MatchStrategy {
        if pattern.is_empty() {
            return MatchStrategy::Never;
        }
        if !pattern.contains('*') {
            return MatchStrategy::Exact(pattern.to_string());
        }

        let starts = pattern.starts_with('*');
        let ends = pattern.ends_with('*');
        let plain = |s: &str| !s.contains('*');

        if pattern.len() <= 2 && starts && ends {
            return MatchStrategy::Contains(String::new());
        }
        if starts && ends {
            let middle = &pattern[1..pattern.len() - 1];
            if plain(middle) {
                return MatchStrategy::Contains(middle.to_string());
            }
        } else if starts {
            let suffix = &pattern[1..];
            if plain(suffix) {
                return MatchStrategy::Suffix(suffix.to_string());
            }
        } else if ends {
            let prefix = &pattern[..pattern.len() - 1];
            if plain(prefix) {
                return MatchStrategy::Prefix(prefix.to_string());
            }
        } else if let Some((prefix, suffix)) = pattern.split_once('*')
            && plain(suffix)
        {
            return MatchStrategy::PrefixSuffix(prefix.to_string(), suffix.to_string());
        }

        match Regex::new(&pattern.replace('*', ".*")) {
            Ok(re) => MatchStrategy::NaiveWildcard(re),
            Err(e) => {
                tracing::debug!(pattern, error = %e, "tag pattern degraded to substring");
                MatchStrategy::Substring(pattern.to_lowercase())
            }
        }
    }

    /// The pattern as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn strategy(&self) -> &MatchStrategy {
        &self.strategy
    }

    /// Whether the pattern is empty and can match nothing.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn matches(&self, tag: &str) -> bool {
        match &self.strategy {
            MatchStrategy::Exact(exact) => tag == exact,
            MatchStrategy::Contains(needle) => tag.contains(needle.as_str()),
            MatchStrategy::Prefix(prefix) => tag.starts_with(prefix.as_str()),
            MatchStrategy::Suffix(suffix) => tag.ends_with(suffix.as_str()),
            MatchStrategy::PrefixSuffix(prefix, suffix) => {
                tag.len() >= prefix.len() + suffix.len()
                    && tag.starts_with(prefix.as_str())
                    && tag.ends_with(suffix.as_str())
            }
            MatchStrategy::NaiveWildcard(re) => re.is_match(tag),
            MatchStrategy::Substring(needle) => tag.to_lowercase().contains(needle),
            MatchStrategy::Never => false,
        }
    }
}
