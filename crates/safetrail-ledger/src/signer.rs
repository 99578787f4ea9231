//! Write-capable signer identity.
//!
//! Derived one-way from configured secret material so writes can be
//! attributed on the ledger without the secret ever leaving the process.
//! The derivation uses its own domain separator, distinct from both the
//! fingerprint and the subject-address domains.

use safetrail_canonical::PseudonymousAddress;
use sha2::{Digest as Sha2Digest, Sha256};

use crate::errors::LedgerError;

/// Domain separator for signer derivation: `b"safetrail:signer:v1\0"`.
const SIGNER_DOMAIN_SEPARATOR: &[u8] = b"safetrail:signer:v1\0";

/// Identity that signs ledger submissions; records attribute access to its
/// address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerIdentity {
    address: PseudonymousAddress,
}

impl SignerIdentity {
    /// Derives the signer from secret seed material.
    pub fn from_seed(seed: &str) -> Result<Self, LedgerError> {
        if seed.trim().is_empty() {
            return Err(LedgerError::Signer("signer seed is empty".into()));
        }
        let mut hasher = Sha256::new();
        hasher.update(SIGNER_DOMAIN_SEPARATOR);
        hasher.update(seed.as_bytes());
        let hash_bytes = hasher.finalize();
        let address = PseudonymousAddress::parse(format!("0x{}", hex::encode(&hash_bytes[..20])))
            .map_err(|err| LedgerError::Signer(err.to_string()))?;
        Ok(Self { address })
    }

    /// Address this signer's writes are attributed to.
    pub fn address(&self) -> &PseudonymousAddress {
        &self.address
    }
}
