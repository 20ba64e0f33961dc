use super::*;
use crate::auth::CredentialStore;
use crate::manifest::DOCKER_MANIFEST;
use sha2::{Digest as Sha2Digest, Sha256};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

type Saved = Rc<RefCell<HashMap<String, Credentials>>>;

/// Writable in-memory store shared with the test through `saved`.
struct MemoryStore {
    saved: Saved,
}

impl CredentialStore for MemoryStore {
    fn name(&self) -> String {
        "memory".to_string()
    }

    fn get(&self, host: &str) -> Result<Option<Credentials>> {
        Ok(self.saved.borrow().get(host).cloned())
    }

    fn store(&self, host: &str, credentials: &Credentials) -> Result<()> {
        self.saved
            .borrow_mut()
            .insert(host.to_string(), credentials.clone());
        Ok(())
    }

    fn is_writable(&self) -> bool {
        true
    }
}

fn session(registry: &str, saved: &Saved) -> Genee {
    let chain = CredentialChain::new(vec![Box::new(MemoryStore {
        saved: Rc::clone(saved),
    })]);
    Genee::builder()
        .registry(registry)
        .timeout(5)
        .credential_chain(chain)
        .build()
        .unwrap()
}

fn seeded(registry: &str) -> (Genee, Saved) {
    let saved: Saved = Rc::default();
    saved
        .borrow_mut()
        .insert(registry_host(registry), Credentials::new("user", "pass"));
    (session(registry, &saved), saved)
}

#[test]
fn test_builder_defaults_come_from_config() {
    let config = Config::from_yaml_str("registry: registry.internal:5000\nsearch:\n  limit: 7\n")
        .unwrap();
    let genee = Genee::builder()
        .config(config)
        .credential_chain(CredentialChain::new(Vec::new()))
        .build()
        .unwrap();

    assert_eq!(genee.registry(), "registry.internal:5000");
    assert_eq!(genee.host(), "registry.internal:5000");
    assert_eq!(genee.default_limit(), 7);
}

#[test]
fn test_builder_rejects_blank_registry() {
    let result = Genee::builder().registry("  ").build();
    assert!(matches!(result.unwrap_err(), GeneeError::Validation { .. }));
}

#[test]
fn test_missing_credentials_fail_fast() {
    let saved: Saved = Rc::default();
    // Nothing listens here; the error must come before any request.
    let genee = session("http://127.0.0.1:1", &saved);

    assert!(!genee.has_valid_credentials());
    assert!(matches!(
        genee.search("php", None, None).unwrap_err(),
        GeneeError::CredentialsNotFound { .. }
    ));
    assert!(matches!(
        genee.list_images(None).unwrap_err(),
        GeneeError::CredentialsNotFound { .. }
    ));
}

#[test]
fn test_login_persists_after_successful_probe() {
    let mut server = mockito::Server::new();
    let probe = server
        .mock("GET", "/v2/")
        .match_header("Authorization", "Basic YWxpY2U6czNjcmV0")
        .with_status(200)
        .create();

    let saved: Saved = Rc::default();
    let genee = session(&server.url(), &saved);
    let store = genee.login("alice", "s3cret").unwrap();

    probe.assert();
    assert_eq!(store, "memory");
    assert_eq!(
        saved.borrow().get(genee.host()),
        Some(&Credentials::new("alice", "s3cret"))
    );
    assert!(genee.has_valid_credentials());
}

#[test]
fn test_login_rejected_probe_stores_nothing() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/v2/").with_status(401).create();

    let saved: Saved = Rc::default();
    let genee = session(&server.url(), &saved);
    let err = genee.login("alice", "wrong").unwrap_err();

    assert!(matches!(
        err,
        GeneeError::Authentication {
            status_code: Some(401),
            ..
        }
    ));
    assert!(saved.borrow().is_empty());
}

#[test]
fn test_login_requires_both_fields() {
    let saved: Saved = Rc::default();
    let genee = session("http://127.0.0.1:1", &saved);

    assert!(matches!(
        genee.login("alice", "").unwrap_err(),
        GeneeError::Validation { .. }
    ));
}

#[test]
fn test_list_images_reports_progress() {
    let mut server = mockito::Server::new();
    let config = r#"{"architecture":"arm64","os":"linux","created":"2024-06-01T12:30:00Z"}"#;
    let config_digest = format!("sha256:{:x}", Sha256::digest(config.as_bytes()));
    let manifest = format!(
        r#"{{"schemaVersion":2,"mediaType":"{}","config":{{"digest":"{}","size":10}},"layers":[{{"size":90}}]}}"#,
        DOCKER_MANIFEST, config_digest
    );

    server
        .mock("GET", "/v2/_catalog")
        .with_status(200)
        .with_body(r#"{"repositories":["genee/node"]}"#)
        .create();
    server
        .mock("GET", "/v2/genee/node/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"genee/node","tags":["18","latest"]}"#)
        .create();
    server
        .mock("GET", "/v2/genee/node/manifests/latest")
        .with_status(200)
        .with_body(manifest)
        .create();
    server
        .mock("GET", format!("/v2/genee/node/blobs/{}", config_digest).as_str())
        .with_status(200)
        .with_body(config)
        .create();

    let (genee, _saved) = seeded(&server.url());
    let mut seen = Vec::new();
    let records = genee
        .list_images_with_progress(None, |done, total| seen.push((done, total)))
        .unwrap();

    assert_eq!(seen, vec![(1, 1)]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tag, "latest");
    assert_eq!(records[0].size, 100);
    assert_eq!(records[0].created.as_deref(), Some("2024-06-01 12:30:00"));
}

#[test]
fn test_search_uses_default_limit() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/v2/_catalog")
        .with_status(200)
        .with_body(r#"{"repositories":["a/one","a/two"]}"#)
        .create();
    let first = server
        .mock("GET", "/v2/a/one/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"a/one","tags":[]}"#)
        .create();
    let second = server.mock("GET", "/v2/a/two/tags/list").expect(0).create();

    let saved: Saved = Rc::default();
    saved
        .borrow_mut()
        .insert(registry_host(&server.url()), Credentials::new("user", "pass"));
    let chain = CredentialChain::new(vec![Box::new(MemoryStore {
        saved: Rc::clone(&saved),
    })]);
    let config = Config::from_yaml_str("search:\n  limit: 1\n").unwrap();
    let genee = Genee::builder()
        .config(config)
        .registry(&server.url())
        .credential_chain(chain)
        .build()
        .unwrap();

    let records = genee.search("a/*", None, None).unwrap();

    first.assert();
    second.assert();
    assert!(records.is_empty());
}

#[test]
fn test_forbidden_repository_does_not_abort_listing_or_search() {
    let mut server = mockito::Server::new();
    let config = r#"{"architecture":"amd64","os":"linux","created":"2024-03-01T08:00:00Z"}"#;
    let config_digest = format!("sha256:{:x}", Sha256::digest(config.as_bytes()));
    let manifest = format!(
        r#"{{"schemaVersion":2,"mediaType":"{}","config":{{"digest":"{}","size":20}},"layers":[{{"size":80}}]}}"#,
        DOCKER_MANIFEST, config_digest
    );

    server
        .mock("GET", "/v2/_catalog")
        .with_status(200)
        .with_body(r#"{"repositories":["private/secret","public/app"]}"#)
        .expect(2)
        .create();
    server
        .mock("GET", "/v2/private/secret/tags/list")
        .with_status(403)
        .expect(2)
        .create();
    server
        .mock("GET", "/v2/public/app/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"public/app","tags":["latest"]}"#)
        .create();
    server
        .mock("GET", "/v2/public/app/manifests/latest")
        .with_status(200)
        .with_body(manifest)
        .create();
    server
        .mock("GET", format!("/v2/public/app/blobs/{}", config_digest).as_str())
        .with_status(200)
        .with_body(config)
        .create();

    let (genee, _saved) = seeded(&server.url());

    let listed = genee.list_images(None).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].repository, "public/app");

    let found = genee.search("*", None, Some(10)).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].repository, "public/app");
    assert_eq!(found[0].tag, "latest");
}
