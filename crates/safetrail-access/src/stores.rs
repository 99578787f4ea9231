//! Trait seams for the external persistence collaborators.
//!
//! Privacy settings, active location shares, and the local audit log are
//! owned by other parts of the host system; this subsystem only performs
//! the operations named here. Everything is behind a trait so tests can
//! substitute in-memory fakes without touching process-wide state.

use chrono::{DateTime, Utc};
use safetrail_canonical::LocationData;
use safetrail_core::{AccessAttempt, AuditLogEntry, AuditTrailFilter};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure in an external store.
#[derive(Error, Debug)]
#[error("store operation failed: {0}")]
pub struct StoreError(pub String);

/// Per-user privacy policy gating the emergency workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PrivacySettings {
    /// Whether emergency services may access this user's location at all.
    pub allow_emergency_access: bool,
}

/// An active location share for a user.
///
/// The embedded precision is the user's chosen disclosure granularity;
/// the workflow never upgrades a response beyond it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationShare {
    /// Shared coordinates at their declared precision.
    pub location: LocationData,
    /// When the share was created; the most recent share is authoritative.
    pub created_at: DateTime<Utc>,
}

/// Read access to per-user privacy settings.
pub trait PrivacyPolicyStore: Send + Sync {
    /// Returns the user's settings, or `None` for unknown users.
    fn settings(&self, user_id: &str) -> Result<Option<PrivacySettings>, StoreError>;
}

/// Read access to a user's active location shares.
pub trait LocationShareStore: Send + Sync {
    /// Returns the active shares for a user; empty when none exist.
    fn active_shares(&self, user_id: &str) -> Result<Vec<LocationShare>, StoreError>;
}

/// Append-and-query access to the local audit log, the system of record
/// for the audit surface. Entries are created once and never mutated.
pub trait AuditLogStore: Send + Sync {
    /// Persists one attempt and returns the stored entry with its id.
    fn append(&self, attempt: &AccessAttempt) -> Result<AuditLogEntry, StoreError>;

    /// Returns a user's entries matching the filter, oldest first.
    fn query(
        &self,
        user_id: &str,
        filter: &AuditTrailFilter,
    ) -> Result<Vec<AuditLogEntry>, StoreError>;
}
