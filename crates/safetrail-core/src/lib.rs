//! Domain events, error taxonomy, and registries for safetrail.
//!
//! This crate provides:
//! - Transient access-event shapes validated before any I/O
//! - Emergency-service credentials and access requests
//! - Audit log entries and the audit-trail filter
//! - The access-side error taxonomy
//! - Registry traits for service and API-key lookups
//!
//! Core invariants:
//! - Events are immutable and discarded after use; nothing here is persisted
//! - Validation happens before any I/O and names the violated constraint
//! - Credential failures are deliberately undifferentiated so error text
//!   cannot be used to enumerate valid service identifiers
//!
#![deny(missing_docs)]

/// Error taxonomy for access-side operations.
pub mod errors;
/// Access events, credentials, requests, and audit entries.
pub mod events;
/// Service and API-key registries.
pub mod registry;

pub use errors::AccessError;
pub use events::{
    AccessAttempt, AuditLogEntry, AuditTrailFilter, BatchAccessItem, BatchLocationAccessEvent,
    EmergencyAccessRequest, EmergencyServiceCredential, EmergencyType, LocationAccessEvent,
    Priority,
};
pub use registry::{
    ApiKeyRegistry, InMemoryApiKeyRegistry, InMemoryServiceRegistry, ServiceRecord,
    ServiceRegistry,
};
