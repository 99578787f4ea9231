//! Pseudonymous address derivation.
//!
//! Addresses are computed as the first 20 bytes of
//! `sha256(domain_separator || user_id)`, hex-encoded with a `0x` prefix.
//! The mapping is deterministic and one-way but deliberately lossy: it
//! scopes ledger reads and writes, it is not a confidentiality boundary.
//! Anyone who can run the function derives the same address for a known
//! user id, and no brute-force resistance is claimed.

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest as Sha2Digest, Sha256};

use crate::identifiers::UserId;
use crate::validation::ValidationError;

/// Domain separator for address derivation: `b"safetrail:address:v1\0"`.
const ADDRESS_DOMAIN_SEPARATOR: &[u8] = b"safetrail:address:v1\0";

/// Number of digest bytes kept for the fixed-width address.
const ADDRESS_WIDTH_BYTES: usize = 20;

/// Fixed-width identifier standing in for a user within the ledger's
/// addressing scheme. Format: `0x` followed by 40 lowercase hex chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PseudonymousAddress(String);

impl PseudonymousAddress {
    /// Parses a validated address from its string form.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let re = Regex::new(r"^0x[0-9a-f]{40}$").expect("invalid regex");
        if !re.is_match(&s) {
            return Err(ValidationError::PatternMismatch {
                field: "PseudonymousAddress",
                value: s,
            });
        }
        Ok(Self(s))
    }
}

impl AsRef<str> for PseudonymousAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PseudonymousAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derives the pseudonymous ledger address for a user.
///
/// Pure and total: the same user id always yields the same address, across
/// calls and restarts. The address is recomputed on every call rather than
/// cached; the derivation is two SHA-256 blocks and caching would introduce
/// invalidation state.
pub fn derive_address(user_id: &UserId) -> PseudonymousAddress {
    let mut hasher = Sha256::new();
    hasher.update(ADDRESS_DOMAIN_SEPARATOR);
    hasher.update(user_id.as_ref().as_bytes());
    let hash_bytes = hasher.finalize();
    PseudonymousAddress(format!("0x{}", hex::encode(&hash_bytes[..ADDRESS_WIDTH_BYTES])))
}
