use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Supported digest algorithms for fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DigestAlg {
    /// SHA-256 (the current safetrail default).
    #[serde(rename = "sha-256")]
    Sha256,
}

/// Deterministic content commitment over a location-access event.
///
/// A fingerprint commits to the event's coordinates, precision, and
/// timestamp without storing any of them; the raw fields stay in the
/// caller's own records. Encoded as base64url without padding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Digest algorithm (currently always `sha-256`).
    pub alg: DigestAlg,
    /// Base64URL (no padding) digest bytes.
    #[serde(rename = "b64")]
    pub b64: String,
}

impl Fingerprint {
    /// Constructs a validated fingerprint from an already-encoded digest.
    pub fn new(alg: DigestAlg, b64: impl Into<String>) -> Result<Self, ValidationError> {
        let b64 = b64.into();
        let re = Regex::new(r"^[A-Za-z0-9_-]{43,44}$").expect("invalid regex");
        if !re.is_match(&b64) {
            return Err(ValidationError::PatternMismatch {
                field: "fingerprint",
                value: b64,
            });
        }
        Ok(Fingerprint { alg, b64 })
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.b64)
    }
}
