//! External credential helper programs (`docker-credential-*`).
//!
//! `get` receives the registry host on stdin and answers with
//! `{"Username": ..., "Secret": ...}` on stdout. `store` receives the host on
//! the first line followed by the same JSON document.

use super::{CredentialStore, Credentials};
use crate::error::{GeneeError, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::process::{Command, Stdio};

#[cfg(test)]
#[path = "helper_tests.rs"]
mod tests;

#[derive(Debug, Serialize, Deserialize)]
struct HelperPayload {
    #[serde(rename = "Username", default)]
    username: String,
    #[serde(rename = "Secret", default)]
    secret: String,
}

/// Credential store backed by an external helper program.
#[derive(Debug, Clone)]
pub struct HelperStore {
    program: String,
}

impl HelperStore {
    /// Creates a store for the helper program name or path.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, action: &str, input: &str) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .arg(action)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GeneeError::credential_helper(self.program.clone(), e.to_string()))?;

        // A helper may exit without reading its input.
        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(input.as_bytes())
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(GeneeError::credential_helper(
                self.program.clone(),
                e.to_string(),
            ));
        }

        let output = child
            .wait_with_output()
            .map_err(|e| GeneeError::credential_helper(self.program.clone(), e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GeneeError::credential_helper(
                self.program.clone(),
                format!("{} exited with {}: {}", action, output.status, stderr.trim()),
            ));
        }

        Ok(output.stdout)
    }
}

impl CredentialStore for HelperStore {
    fn name(&self) -> String {
        format!("helper:{}", self.program)
    }

    fn get(&self, host: &str) -> Result<Option<Credentials>> {
        let stdout = self.run("get", host)?;
        let payload: HelperPayload = serde_json::from_slice(&stdout).map_err(|e| {
            GeneeError::credential_helper(self.program.clone(), format!("unreadable answer: {}", e))
        })?;

        let creds = Credentials::new(payload.username, payload.secret);
        Ok(creds.is_complete().then_some(creds))
    }

    fn store(&self, host: &str, credentials: &Credentials) -> Result<()> {
        let payload = HelperPayload {
            username: credentials.username.clone(),
            secret: credentials.secret.clone(),
        };
        let body = serde_json::to_string(&payload)
            .map_err(|e| GeneeError::credential_helper(self.program.clone(), e.to_string()))?;

        self.run("store", &format!("{}\n{}", host, body))?;
        Ok(())
    }

    fn is_writable(&self) -> bool {
        true
    }
}
