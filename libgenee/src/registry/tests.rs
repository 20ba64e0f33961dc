use super::*;
use crate::auth::Credentials;
use crate::manifest::{DOCKER_MANIFEST, OCI_INDEX, PlatformId};
use crate::rank::PlatformFilter;
use crate::search::CatalogSearch;
use sha2::{Digest as Sha2Digest, Sha256};

fn sha256_digest(content: &str) -> String {
    format!("sha256:{:x}", Sha256::digest(content.as_bytes()))
}

const CONFIG: &str = r#"{"architecture":"amd64","os":"linux","created":"2024-05-01T09:00:00Z"}"#;

fn single_manifest(config_digest: &str) -> String {
    format!(
        r#"{{"schemaVersion":2,"mediaType":"{}","config":{{"mediaType":"application/vnd.docker.container.image.v1+json","digest":"{}","size":100}},"layers":[{{"size":1000}},{{"size":24}}]}}"#,
        DOCKER_MANIFEST, config_digest
    )
}

fn registry_for(server: &mockito::Server) -> Registry {
    let client = Client::new(&server.url(), Some(Credentials::new("user", "pass"))).unwrap();
    Registry::new(client)
}

#[test]
fn test_describe_single_platform_manifest() {
    let mut server = mockito::Server::new();
    let config_digest = sha256_digest(CONFIG);

    let manifest_mock = server
        .mock("GET", "/v2/genee/php/manifests/8.1")
        .match_header("Authorization", "Basic dXNlcjpwYXNz")
        .with_status(200)
        .with_header("Content-Type", DOCKER_MANIFEST)
        .with_header("Docker-Content-Digest", "sha256:manifestdigest")
        .with_body(single_manifest(&config_digest))
        .create();
    let blob_mock = server
        .mock("GET", format!("/v2/genee/php/blobs/{}", config_digest).as_str())
        .with_status(200)
        .with_body(CONFIG)
        .create();

    let descriptor = registry_for(&server)
        .describe_manifest("genee/php", "8.1")
        .unwrap();

    manifest_mock.assert();
    blob_mock.assert();
    assert_eq!(descriptor.digest.as_deref(), Some("sha256:manifestdigest"));
    assert_eq!(descriptor.size, 1124);
    assert_eq!(descriptor.created.as_deref(), Some("2024-05-01 09:00:00"));
    assert_eq!(descriptor.platforms, vec![PlatformId::new("linux", "amd64")]);
}

#[test]
fn test_describe_index_fetches_first_child_only() {
    let mut server = mockito::Server::new();
    let config_digest = sha256_digest(CONFIG);
    let child = single_manifest(&config_digest);
    let index = format!(
        r#"{{"schemaVersion":2,"mediaType":"{}","manifests":[
            {{"digest":"sha256:child1","platform":{{"os":"linux","architecture":"amd64"}}}},
            {{"digest":"sha256:child2","platform":{{"os":"linux","architecture":"arm64","variant":"v8"}}}}
        ]}}"#,
        OCI_INDEX
    );

    let index_mock = server
        .mock("GET", "/v2/genee/php/manifests/latest")
        .with_status(200)
        .with_body(index)
        .create();
    let child_mock = server
        .mock("GET", "/v2/genee/php/manifests/sha256:child1")
        .with_status(200)
        .with_body(child)
        .create();
    let other_child = server
        .mock("GET", "/v2/genee/php/manifests/sha256:child2")
        .expect(0)
        .create();
    let blob_mock = server
        .mock("GET", format!("/v2/genee/php/blobs/{}", config_digest).as_str())
        .with_status(200)
        .with_body(CONFIG)
        .create();

    let descriptor = registry_for(&server)
        .describe_manifest("genee/php", "latest")
        .unwrap();

    index_mock.assert();
    child_mock.assert();
    other_child.assert();
    blob_mock.assert();
    assert!(descriptor.digest.is_none());
    assert_eq!(descriptor.size, 1124);
    assert_eq!(
        descriptor.platforms,
        vec![
            PlatformId::new("linux", "amd64"),
            PlatformId::new("linux", "arm64")
        ]
    );
}

#[test]
fn test_describe_missing_manifest_is_not_found() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v2/genee/php/manifests/9.0")
        .with_status(404)
        .create();

    let err = registry_for(&server)
        .describe_manifest("genee/php", "9.0")
        .unwrap_err();

    mock.assert();
    assert!(matches!(err, crate::error::GeneeError::NotFound { .. }));
}

#[test]
fn test_search_end_to_end() {
    let mut server = mockito::Server::new();
    let config_digest = sha256_digest(CONFIG);

    server
        .mock("GET", "/v2/_catalog")
        .with_status(200)
        .with_body(r#"{"repositories":["genee/php","genee/redis","other"]}"#)
        .create();
    server
        .mock("GET", "/v2/genee/php/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"genee/php","tags":["7.4","8.1"]}"#)
        .create();
    server
        .mock("GET", "/v2/genee/redis/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"genee/redis","tags":["6"]}"#)
        .create();
    for path in [
        "/v2/genee/php/manifests/8.1",
        "/v2/genee/redis/manifests/6",
    ] {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("Content-Type", DOCKER_MANIFEST)
            .with_body(single_manifest(&config_digest))
            .create();
    }
    for repo in ["genee/php", "genee/redis"] {
        server
            .mock("GET", format!("/v2/{}/blobs/{}", repo, config_digest).as_str())
            .with_status(200)
            .with_body(CONFIG)
            .create();
    }
    let untouched = server
        .mock("GET", "/v2/other/tags/list")
        .expect(0)
        .create();

    let registry = registry_for(&server);
    let filter = PlatformFilter::parse(Some("amd64"));
    let records = CatalogSearch::new(&registry)
        .search("genee:8*", filter.as_ref(), 100)
        .unwrap();

    untouched.assert();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].repository, "genee/php");
    assert_eq!(records[0].tag, "8.1");
    assert_eq!(records[0].size, 1124);
}
