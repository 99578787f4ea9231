//! In-memory store implementations for tests and local development.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use safetrail_core::{AccessAttempt, AuditLogEntry, AuditTrailFilter};

use crate::stores::{
    AuditLogStore, LocationShare, LocationShareStore, PrivacyPolicyStore, PrivacySettings,
    StoreError,
};

// A poisoned lock still guards consistent data in these stores (no
// operation can panic between mutations), so recover the guard instead of
// panicking.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory privacy-policy store.
#[derive(Debug, Default)]
pub struct InMemoryPrivacyStore {
    settings: Mutex<HashMap<String, PrivacySettings>>,
}

impl InMemoryPrivacyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a user's privacy settings.
    pub fn set(&self, user_id: impl Into<String>, settings: PrivacySettings) {
        lock(&self.settings).insert(user_id.into(), settings);
    }
}

impl PrivacyPolicyStore for InMemoryPrivacyStore {
    fn settings(&self, user_id: &str) -> Result<Option<PrivacySettings>, StoreError> {
        Ok(lock(&self.settings).get(user_id).copied())
    }
}

/// In-memory location-share store.
#[derive(Debug, Default)]
pub struct InMemoryShareStore {
    shares: Mutex<HashMap<String, Vec<LocationShare>>>,
}

impl InMemoryShareStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an active share for a user.
    pub fn add(&self, user_id: impl Into<String>, share: LocationShare) {
        lock(&self.shares)
            .entry(user_id.into())
            .or_default()
            .push(share);
    }
}

impl LocationShareStore for InMemoryShareStore {
    fn active_shares(&self, user_id: &str) -> Result<Vec<LocationShare>, StoreError> {
        Ok(lock(&self.shares)
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Debug, Default)]
struct AuditState {
    entries: Vec<AuditLogEntry>,
    next_id: u64,
    failing: bool,
}

/// In-memory audit-log store with failure injection.
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    state: Mutex<AuditState>,
}

impl InMemoryAuditStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent append fail, for fatal-path tests.
    pub fn fail_appends(&self, failing: bool) {
        lock(&self.state).failing = failing;
    }

    /// Snapshot of every stored entry, oldest first.
    pub fn entries(&self) -> Vec<AuditLogEntry> {
        lock(&self.state).entries.clone()
    }
}

impl AuditLogStore for InMemoryAuditStore {
    fn append(&self, attempt: &AccessAttempt) -> Result<AuditLogEntry, StoreError> {
        let mut state = lock(&self.state);
        if state.failing {
            return Err(StoreError("audit store write rejected".into()));
        }
        state.next_id += 1;
        let entry = AuditLogEntry {
            id: state.next_id,
            user_id: attempt.user_id.clone(),
            service_id: attempt.service_id.clone(),
            operator_id: attempt.operator_id.clone(),
            incident_id: attempt.incident_id.clone(),
            emergency_type: attempt.emergency_type,
            jurisdiction: attempt.jurisdiction.clone(),
            access_granted: attempt.access_granted,
            request_reason: attempt.request_reason.clone(),
            created_at: Utc::now(),
        };
        state.entries.push(entry.clone());
        Ok(entry)
    }

    fn query(
        &self,
        user_id: &str,
        filter: &AuditTrailFilter,
    ) -> Result<Vec<AuditLogEntry>, StoreError> {
        let state = lock(&self.state);
        Ok(state
            .entries
            .iter()
            .filter(|entry| entry.user_id == user_id && filter.matches(entry))
            .cloned()
            .collect())
    }
}
