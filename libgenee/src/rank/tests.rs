use super::*;
use std::collections::HashMap;

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn descriptor(created: Option<&str>, platforms: &[(&str, &str)]) -> ManifestDescriptor {
    ManifestDescriptor {
        digest: Some("sha256:feed".to_string()),
        size: 1024,
        created: created.map(str::to_string),
        platforms: platforms
            .iter()
            .map(|(os, arch)| PlatformId::new(*os, *arch))
            .collect(),
    }
}

/// Lookup over a fixed table that counts calls per tag.
struct Table {
    entries: HashMap<String, ManifestDescriptor>,
    calls: HashMap<String, usize>,
}

impl Table {
    fn new(entries: Vec<(&str, ManifestDescriptor)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(tag, d)| (tag.to_string(), d))
                .collect(),
            calls: HashMap::new(),
        }
    }

    fn calls(&self, tag: &str) -> usize {
        self.calls.get(tag).copied().unwrap_or(0)
    }
}

impl ManifestLookup for Table {
    fn lookup(&mut self, tag: &str) -> Result<ManifestDescriptor> {
        *self.calls.entry(tag.to_string()).or_default() += 1;
        self.entries
            .get(tag)
            .cloned()
            .ok_or_else(|| GeneeError::not_found("manifest", tag))
    }
}

const AMD: &[(&str, &str)] = &[("linux", "amd64")];
const MULTI: &[(&str, &str)] = &[("linux", "amd64"), ("linux", "arm64")];

#[test]
fn test_empty_tag_list_is_no_matching_tag() {
    let mut table = Table::new(vec![]);
    let err = select_tag("php", &[], None, &mut table).unwrap_err();
    assert!(matches!(err, GeneeError::NoMatchingTag { .. }));
}

#[test]
fn test_latest_wins_over_newer_tags() {
    let mut table = Table::new(vec![
        ("8.2", descriptor(Some("2024-06-01 00:00:00"), MULTI)),
        ("latest", descriptor(Some("2020-01-01 00:00:00"), AMD)),
    ]);

    let result = select_tag("php", &tags(&["8.2", "latest"]), None, &mut table).unwrap();

    assert_eq!(result.tag, "latest");
    assert_eq!(table.calls("8.2"), 0);
}

#[test]
fn test_newest_tag_wins() {
    let mut table = Table::new(vec![
        ("7.4", descriptor(Some("2022-01-01 00:00:00"), AMD)),
        ("8.1", descriptor(Some("2024-02-01 12:00:00"), AMD)),
        ("8.0", descriptor(Some("2023-01-01 00:00:00"), AMD)),
    ]);

    let result = select_tag("php", &tags(&["7.4", "8.1", "8.0"]), None, &mut table).unwrap();

    assert_eq!(result.tag, "8.1");
    assert_eq!(result.platforms, vec![PlatformId::new("linux", "amd64")]);
}

#[test]
fn test_tie_prefers_multi_platform() {
    let mut table = Table::new(vec![
        ("a", descriptor(Some("2024-01-01 00:00:00"), AMD)),
        ("b", descriptor(Some("2024-01-01 00:00:00"), MULTI)),
        ("c", descriptor(Some("2024-01-01 00:00:00"), MULTI)),
    ]);

    let result = select_tag("php", &tags(&["a", "b", "c"]), None, &mut table).unwrap();
    assert_eq!(result.tag, "b");
}

#[test]
fn test_tie_without_multi_platform_takes_first() {
    let mut table = Table::new(vec![
        ("old", descriptor(Some("2020-01-01 00:00:00"), MULTI)),
        ("x", descriptor(Some("2024-01-01 00:00:00"), AMD)),
        ("y", descriptor(Some("2024-01-01 00:00:00"), AMD)),
    ]);

    let result = select_tag("php", &tags(&["old", "x", "y"]), None, &mut table).unwrap();
    assert_eq!(result.tag, "x");
}

#[test]
fn test_unparseable_timestamps_fall_back_to_first_tag() {
    let mut table = Table::new(vec![
        ("first", descriptor(Some("not a date"), AMD)),
        ("second", descriptor(None, MULTI)),
    ]);

    let result = select_tag("php", &tags(&["first", "second"]), None, &mut table).unwrap();
    assert_eq!(result.tag, "first");
}

#[test]
fn test_unparseable_timestamp_excluded_from_ranking() {
    let mut table = Table::new(vec![
        ("garbled", descriptor(Some("2024/12/31"), MULTI)),
        ("dated", descriptor(Some("2021-05-05 05:05:05"), AMD)),
    ]);

    let result = select_tag("php", &tags(&["garbled", "dated"]), None, &mut table).unwrap();
    assert_eq!(result.tag, "dated");
}

#[test]
fn test_failed_lookup_excludes_tag_from_ranking() {
    let mut table = Table::new(vec![("ok", descriptor(Some("2021-01-01 00:00:00"), AMD))]);

    let result = select_tag("php", &tags(&["broken", "ok"]), None, &mut table).unwrap();
    assert_eq!(result.tag, "ok");
}

#[test]
fn test_failed_fallback_selection_keeps_tag_with_empty_manifest() {
    let mut table = Table::new(vec![]);

    let result = select_tag("php", &tags(&["broken"]), None, &mut table).unwrap();
    assert_eq!(result.tag, "broken");
    assert_eq!(result.manifest, ManifestDescriptor::default());
    assert_eq!(table.calls("broken"), 1);
}

#[test]
fn test_latest_selected_even_when_manifest_unreadable() {
    let mut table = Table::new(vec![("8.1", descriptor(Some("2024-01-01 00:00:00"), AMD))]);

    let result = select_tag("php", &tags(&["8.1", "latest"]), None, &mut table).unwrap();
    assert_eq!(result.tag, "latest");
    assert!(result.platforms.is_empty());
    assert!(result.manifest.digest.is_none());
    assert_eq!(result.manifest.size, 0);
}

#[test]
fn test_platform_filter_prefilters_candidates() {
    let mut table = Table::new(vec![
        ("latest", descriptor(Some("2024-01-01 00:00:00"), AMD)),
        ("arm", descriptor(Some("2020-01-01 00:00:00"), MULTI)),
    ]);
    let filter = PlatformFilter::parse(Some("ARM64"));

    let result = select_tag(
        "php",
        &tags(&["latest", "arm"]),
        filter.as_ref(),
        &mut table,
    )
    .unwrap();

    assert_eq!(result.tag, "arm");
}

#[test]
fn test_platform_filter_with_no_survivors_never_falls_back() {
    let mut table = Table::new(vec![
        ("latest", descriptor(Some("2024-01-01 00:00:00"), AMD)),
        ("old", descriptor(None, &[])),
    ]);
    let filter = PlatformFilter::parse(Some("riscv"));

    let err = select_tag(
        "php",
        &tags(&["latest", "old"]),
        filter.as_ref(),
        &mut table,
    )
    .unwrap_err();

    assert!(matches!(err, GeneeError::NoMatchingTag { repository } if repository == "php"));
}

#[test]
fn test_each_tag_looked_up_once() {
    let mut table = Table::new(vec![
        ("a", descriptor(Some("2024-01-01 00:00:00"), AMD)),
        ("b", descriptor(Some("2024-01-01 00:00:00"), MULTI)),
    ]);
    let filter = PlatformFilter::parse(Some("linux"));

    select_tag("php", &tags(&["a", "b"]), filter.as_ref(), &mut table).unwrap();

    assert_eq!(table.calls("a"), 1);
    assert_eq!(table.calls("b"), 1);
}

#[test]
fn test_closure_lookup() {
    let mut lookup = |tag: &str| -> Result<ManifestDescriptor> {
        Ok(descriptor(
            Some(if tag == "new" {
                "2024-01-01 00:00:00"
            } else {
                "2023-01-01 00:00:00"
            }),
            AMD,
        ))
    };

    let result = select_tag("php", &tags(&["old", "new"]), None, &mut lookup).unwrap();
    assert_eq!(result.tag, "new");
}
