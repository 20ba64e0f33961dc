//! Read-only access to the credentials file written by earlier releases.
//!
//! The file holds a single plain JSON object, `{"username": ..., "password": ...}`,
//! and is not tied to a particular registry host. It is never written; new
//! logins go to a credential helper or a docker config document.

use super::{CredentialStore, Credentials};
use crate::error::{GeneeError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

#[derive(Debug, Deserialize)]
struct LegacyCredential {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Legacy `~/.docker-genee/credentials.json` file.
#[derive(Debug, Clone)]
pub struct LegacyCredentialFile {
    path: PathBuf,
}

impl LegacyCredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for LegacyCredentialFile {
    fn name(&self) -> String {
        format!("legacy-file:{}", self.path.display())
    }

    fn get(&self, _host: &str) -> Result<Option<Credentials>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            GeneeError::config_with_source("Failed to read credentials file", self.path.to_str(), e)
        })?;
        let stored: LegacyCredential = serde_json::from_str(&contents).map_err(|e| {
            GeneeError::config_with_source(
                "Failed to parse credentials file",
                self.path.to_str(),
                e,
            )
        })?;

        let creds = Credentials::new(stored.username, stored.password);
        Ok(creds.is_complete().then_some(creds))
    }
}
