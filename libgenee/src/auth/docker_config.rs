//! Docker client configuration documents (`~/.docker/config.json`).
//!
//! Only the `auths` section is interpreted:
//! `{"auths": {"<host>": {"auth": "<base64 user:secret>"}}}`. Writing keeps
//! every other key of the document intact.

use super::{CredentialStore, Credentials};
use crate::error::{GeneeError, Result};
use base64::{Engine as _, engine::general_purpose};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(test)]
#[path = "docker_config_tests.rs"]
mod tests;

/// Credential store backed by one docker config document.
#[derive(Debug, Clone)]
pub struct DockerConfigStore {
    path: PathBuf,
}

impl DockerConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Option<Map<String, Value>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            GeneeError::config_with_source("Failed to read docker config", self.path.to_str(), e)
        })?;

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(_) => Err(GeneeError::config(
                "Docker config is not a JSON object",
                self.path.to_str(),
            )),
            Err(e) => Err(GeneeError::config_with_source(
                "Failed to parse docker config",
                self.path.to_str(),
                e,
            )),
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        let contents = serde_json::to_string_pretty(document).map_err(|e| {
            GeneeError::config_with_source("Failed to serialize docker config", self.path.to_str(), e)
        })?;

        if let Some(parent) = self.path.parent() {
            create_private_dir(parent).map_err(|e| {
                GeneeError::config_with_source(
                    "Failed to create docker config directory",
                    parent.to_str(),
                    e,
                )
            })?;
        }

        fs::write(&self.path, contents).map_err(|e| {
            GeneeError::config_with_source("Failed to write docker config", self.path.to_str(), e)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                GeneeError::config_with_source(
                    "Failed to set docker config permissions",
                    self.path.to_str(),
                    e,
                )
            })?;
        }

        Ok(())
    }
}

fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
    }

    #[cfg(not(unix))]
    {
        fs::create_dir_all(dir)
    }
}

/// Decodes an `auth` value into credentials, splitting on the first colon.
pub fn decode_auth(auth: &str) -> Result<Credentials> {
    let decoded = general_purpose::STANDARD
        .decode(auth.trim())
        .map_err(|e| GeneeError::validation_with_source("Invalid base64 in docker config", e))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|e| GeneeError::validation_with_source("Invalid UTF-8 in docker config", e))?;

    let (username, secret) = decoded
        .split_once(':')
        .ok_or_else(|| GeneeError::validation("Docker config auth has no ':' separator"))?;

    Ok(Credentials::new(username, secret))
}

impl CredentialStore for DockerConfigStore {
    fn name(&self) -> String {
        format!("docker-config:{}", self.path.display())
    }

    fn get(&self, host: &str) -> Result<Option<Credentials>> {
        let Some(document) = self.read_document()? else {
            return Ok(None);
        };

        let auth = document
            .get("auths")
            .and_then(|auths| auths.get(host))
            .and_then(|entry| entry.get("auth"))
            .and_then(Value::as_str)
            .filter(|auth| !auth.is_empty());

        match auth {
            Some(auth) => decode_auth(auth).map(Some),
            None => Ok(None),
        }
    }

    fn store(&self, host: &str, credentials: &Credentials) -> Result<()> {
        let mut document = self.read_document()?.unwrap_or_default();

        let auths = document
            .entry("auths")
            .or_insert_with(|| Value::Object(Map::new()));
        if !auths.is_object() {
            *auths = Value::Object(Map::new());
        }

        if let Value::Object(auths) = auths {
            let entry = auths
                .entry(host.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(entry) = entry {
                entry.insert("auth".to_string(), Value::String(credentials.encoded()));
            }
        }

        self.write_document(&document)
    }

    fn is_writable(&self) -> bool {
        true
    }
}
