//! Hash-storage endpoints over the ledger client.
//!
//! These are the dedicated storage calls: the ledger write is their sole
//! purpose, so a write failure is fatal to the call, unlike the recovered
//! best-effort write inside the emergency workflow. Raw coordinates never
//! reach the ledger; only fingerprints do.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use safetrail_canonical::{
    compute_fingerprint, derive_address, FingerprintError, IncidentId, LocationData,
    PseudonymousAddress, UserId, ValidationError,
};
use safetrail_core::{BatchLocationAccessEvent, LocationAccessEvent};
use safetrail_ledger::{ConnectionStatus, LedgerClient, LedgerError, WriteReceipt};

use crate::response::{AuthorizedOutcome, StoreOutcome, TrailOutcome, VerifyOutcome};

#[derive(thiserror::Error, Debug)]
enum HashStorageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Storage endpoints converting access events into ledger records.
pub struct LocationHashStorage {
    ledger: Arc<LedgerClient>,
}

impl LocationHashStorage {
    /// Creates the storage endpoints over a ledger client.
    pub fn new(ledger: Arc<LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Records one access event on the ledger.
    pub fn store_location_access_hash(&self, event: &LocationAccessEvent) -> StoreOutcome {
        match self.store_single(event) {
            Ok(receipt) => StoreOutcome::ok(receipt),
            Err(err) => {
                tracing::warn!(error = %err, "failed to store location access hash");
                StoreOutcome::failure(err.to_string())
            }
        }
    }

    fn store_single(&self, event: &LocationAccessEvent) -> Result<WriteReceipt, HashStorageError> {
        event.validate()?;
        let user_id = UserId::parse(event.user_id.clone())?;
        let incident_id = IncidentId::parse(event.incident_id.clone())?;
        let fingerprint = compute_fingerprint(&event.location_data, event.timestamp)?;
        let subject = derive_address(&user_id);
        Ok(self.ledger.write_single(&subject, fingerprint, incident_id)?)
    }

    /// Records a batch of pre-collected events as one all-or-nothing
    /// ledger transaction. Partial success cannot occur: the caller sees
    /// full success or full failure.
    pub fn batch_store_location_access_hashes(
        &self,
        batch: &BatchLocationAccessEvent,
    ) -> StoreOutcome {
        match self.store_batch(batch) {
            Ok(receipt) => StoreOutcome::ok(receipt),
            Err(err) => {
                tracing::warn!(error = %err, "failed to batch store location access hashes");
                StoreOutcome::failure(err.to_string())
            }
        }
    }

    fn store_batch(&self, batch: &BatchLocationAccessEvent) -> Result<WriteReceipt, HashStorageError> {
        batch.validate(self.ledger.max_batch())?;
        let user_id = UserId::parse(batch.user_id.clone())?;
        let subject = derive_address(&user_id);

        let mut fingerprints = Vec::with_capacity(batch.access_logs.len());
        let mut incident_ids = Vec::with_capacity(batch.access_logs.len());
        for item in &batch.access_logs {
            fingerprints.push(compute_fingerprint(&item.location_data, item.timestamp)?);
            incident_ids.push(IncidentId::parse(item.incident_id.clone())?);
        }

        Ok(self.ledger.write_batch(&subject, fingerprints, incident_ids)?)
    }

    /// Checks that an access was recorded and attributed to the reader.
    pub fn verify_location_access(
        &self,
        user_id: &str,
        location: &LocationData,
        timestamp: DateTime<Utc>,
        reader: &PseudonymousAddress,
    ) -> VerifyOutcome {
        let verified = (|| -> Result<bool, HashStorageError> {
            location.validate()?;
            let user_id = UserId::parse(user_id)?;
            let fingerprint = compute_fingerprint(location, timestamp)?;
            let subject = derive_address(&user_id);
            Ok(self.ledger.verify_access(&subject, &fingerprint, reader)?)
        })();
        match verified {
            Ok(verified) => VerifyOutcome {
                success: true,
                verified,
                error: None,
            },
            Err(err) => VerifyOutcome {
                success: false,
                verified: false,
                error: Some(err.to_string()),
            },
        }
    }

    /// Reads a page of a user's ledger records, in ledger-insertion order
    /// (not a caller-specified sort). Defaults: offset 0, limit 50.
    pub fn get_location_access_audit_trail(
        &self,
        user_id: &str,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> TrailOutcome {
        let logs = (|| -> Result<_, HashStorageError> {
            let user_id = UserId::parse(user_id)?;
            let subject = derive_address(&user_id);
            Ok(self.ledger.query_records(&subject, offset, limit)?)
        })();
        match logs {
            Ok(logs) => TrailOutcome {
                success: true,
                logs,
                error: None,
            },
            Err(err) => TrailOutcome {
                success: false,
                logs: Vec::new(),
                error: Some(err.to_string()),
            },
        }
    }

    /// Checks a reader against the ledger's authorized-reader registry.
    pub fn is_authorized_reader(&self, reader: &PseudonymousAddress) -> AuthorizedOutcome {
        match self.ledger.is_authorized_reader(reader) {
            Ok(authorized) => AuthorizedOutcome {
                success: true,
                authorized,
                error: None,
            },
            Err(err) => AuthorizedOutcome {
                success: false,
                authorized: false,
                error: Some(err.to_string()),
            },
        }
    }

    /// Reports ledger connectivity. Never fails.
    pub fn connection_status(&self) -> ConnectionStatus {
        self.ledger.connection_status()
    }
}
