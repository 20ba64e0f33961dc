use super::*;
use crate::commands::test_support::{context, seed_credentials};
use crate::format::OutputFormat;
use tempfile::tempdir;

fn empty_results(platform: Option<&str>) -> SearchResults {
    SearchResults {
        query: "php:9*".to_string(),
        platform: platform.map(str::to_string),
        total: 0,
        images: Vec::new(),
    }
}

#[test]
fn test_no_results_message() {
    assert_eq!(
        empty_results(None).format_pretty(),
        "No images matching 'php:9*'\n"
    );
    assert_eq!(
        empty_results(Some("arm64")).format_pretty(),
        "No images matching 'php:9*' (platform: arm64)\n"
    );
}

#[test]
fn test_results_serialize_as_json() {
    let output = format::format_output(&empty_results(Some("arm64")), OutputFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(json["query"], "php:9*");
    assert_eq!(json["platform"], "arm64");
    assert_eq!(json["total"], 0);
    assert!(json["images"].as_array().unwrap().is_empty());
}

#[test]
fn test_search_one_record_per_matching_tag() {
    let mut server = mockito::Server::new();
    let dir = tempdir().unwrap();
    let docker_config = seed_credentials(dir.path(), &server.url());

    server
        .mock("GET", "/v2/_catalog")
        .with_status(200)
        .with_body(r#"{"repositories":["genee/php","genee/node"]}"#)
        .create();
    server
        .mock("GET", "/v2/genee/php/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"genee/php","tags":["7.4","8.1","8.2"]}"#)
        .create();
    for tag in ["8.1", "8.2"] {
        server
            .mock("GET", format!("/v2/genee/php/manifests/{}", tag).as_str())
            .with_status(200)
            .with_body(
                r#"{"schemaVersion":2,"mediaType":"application/vnd.oci.image.manifest.v1+json","config":{"size":10,"os":"linux","architecture":"amd64"},"layers":[]}"#,
            )
            .create();
    }
    let untouched = server
        .mock("GET", "/v2/genee/node/tags/list")
        .expect(0)
        .create();

    let ctx = context(&server.url(), &docker_config);
    let results = search(&ctx, "php:8*", Some(" "), None).unwrap();

    untouched.assert();
    assert!(results.platform.is_none());
    assert_eq!(results.total, 2);
    let tags: Vec<&str> = results.images.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(tags, vec!["8.1", "8.2"]);
}
