//! Deterministic derivation primitives for safetrail audit records.
//!
//! Everything that participates in hashing lives here: validated location
//! data, canonical fingerprint computation, and the pseudonymous address
//! mapping used to scope ledger reads and writes. All derivations are pure
//! functions of their inputs so that identical logical events produce
//! identical fingerprints across processes and restarts.
//!
#![deny(missing_docs)]

/// Pseudonymous address derivation from user identifiers.
pub mod address;
/// Digest primitives shared by fingerprints.
pub mod digest;
/// Canonical fingerprint computation for location-access events.
pub mod fingerprint;
/// Validated string identifiers (user, service, operator, incident).
pub mod identifiers;
/// Validated coordinates and disclosure precision.
pub mod location;
/// Validation errors raised by canonical types.
pub mod validation;

pub use address::{derive_address, PseudonymousAddress};
pub use digest::{DigestAlg, Fingerprint};
pub use fingerprint::{compute_fingerprint, canonical_timestamp, FingerprintError};
pub use identifiers::{ApiKey, IncidentId, OperatorId, ServiceId, UserId};
pub use location::{LocationData, Precision};
pub use validation::ValidationError;
