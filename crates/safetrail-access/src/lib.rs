//! Emergency-access orchestration and hash-storage endpoints.
//!
//! This crate provides:
//! - `EmergencyAccessService`: authenticates emergency-service credentials,
//!   enforces the user's privacy policy, fetches the authoritative location
//!   share, writes the local audit entry, and best-effort records the
//!   access fingerprint on the ledger
//! - `LocationHashStorage`: the dedicated storage endpoints where the
//!   ledger write is the call's sole purpose and its failure is fatal
//! - Store traits for the external privacy, share, and audit collaborators,
//!   with in-memory implementations for tests and local development
//! - Uniform `{success, ..., error?}` response envelopes; nothing raises
//!   past this boundary
//!
#![deny(missing_docs)]

/// Hash-storage endpoints over the ledger client.
pub mod hash_storage;
/// In-memory store implementations.
pub mod memory;
/// The emergency-access orchestrator.
pub mod orchestrator;
/// Uniform response envelopes.
pub mod response;
/// External store traits.
pub mod stores;

pub use hash_storage::LocationHashStorage;
pub use memory::{InMemoryAuditStore, InMemoryPrivacyStore, InMemoryShareStore};
pub use orchestrator::{
    AuditTrail, EmergencyAccessResult, EmergencyAccessService, EmergencyServiceInfo,
};
pub use response::{AuthorizedOutcome, ServiceResponse, StoreOutcome, TrailOutcome, VerifyOutcome};
pub use stores::{
    AuditLogStore, LocationShare, LocationShareStore, PrivacyPolicyStore, PrivacySettings,
    StoreError,
};
