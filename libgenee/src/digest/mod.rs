//! OCI content digest validation and verification.
//!
//! Wraps `oci_spec::image::Digest` so parse failures surface as
//! [`GeneeError::Validation`], and adds sha256 verification of downloaded
//! blobs.

use crate::error::{GeneeError, Result};
use oci_spec::image::Digest as OciDigest;
use sha2::{Digest as Sha2Digest, Sha256};
use std::fmt;
use std::str::FromStr;


/// A content digest such as `sha256:7173b8...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(OciDigest);

impl Digest {
    /// Algorithm part of the digest (`sha256`, `sha512`, ...).
    pub fn algorithm(&self) -> String {
        self.split().0
    }

    /// Hex-encoded hash part of the digest.
    pub fn hex(&self) -> String {
        self.split().1
    }

    fn split(&self) -> (String, String) {
        let s = self.0.to_string();
        match s.split_once(':') {
            Some((algorithm, hex)) => (algorithm.to_string(), hex.to_string()),
            None => (String::new(), s),
        }
    }

    /// Checks that `content` hashes to this digest.
    ///
    /// Only sha256 is supported; any other algorithm is a validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgenee::digest::Digest;
    /// use std::str::FromStr;
    ///
    /// let digest = Digest::from_str(
    ///     "sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
    /// ).unwrap();
    /// assert!(digest.verify(b"hello").is_ok());
    /// assert!(digest.verify(b"world").is_err());
    /// ```
    pub fn verify(&self, content: &[u8]) -> Result<()> {
        let algorithm = self.algorithm();
        if algorithm != "sha256" {
            return Err(GeneeError::validation(format!(
                "Unsupported digest algorithm: {}",
                algorithm
            )));
        }

        let computed = format!("{:x}", Sha256::digest(content));
        if computed != self.hex() {
            return Err(GeneeError::validation(format!(
                "Digest mismatch: expected {}, computed sha256:{}",
                self, computed
            )));
        }
        Ok(())
    }
}

impl FromStr for Digest {
    type Err = GeneeError;

    fn from_str(s: &str) -> Result<Self> {
        let oci_digest = OciDigest::from_str(s).map_err(|e| {
            GeneeError::validation_with_source(format!("Invalid digest format: {}", s), e)
        })?;
        Ok(Digest(oci_digest))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
