//! Ledger client implementation.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use safetrail_canonical::{Fingerprint, IncidentId, PseudonymousAddress, ValidationError};

use crate::config::LedgerConfig;
use crate::errors::LedgerError;
use crate::record::{ConnectionStatus, LedgerBackend, LedgerEntry, LedgerRecord, WriteReceipt};
use crate::signer::SignerIdentity;

/// Default page size for audit-trail reads.
pub const DEFAULT_PAGE_LIMIT: u64 = 50;

/// Client over an append-only ledger backend.
///
/// Construction never fails: if the connectivity probe fails, the client
/// comes up in an unavailable state and every operation except
/// [`connection_status`](Self::connection_status) returns
/// [`LedgerError::Unavailable`]. The write-capable signer is materialized
/// lazily and memoized; concurrent first callers converge on one identity.
pub struct LedgerClient {
    backend: Arc<dyn LedgerBackend>,
    config: LedgerConfig,
    connected: bool,
    connect_error: Option<String>,
    signer: OnceLock<SignerIdentity>,
}

impl LedgerClient {
    /// Connects to the ledger through the given backend.
    ///
    /// A failed probe leaves the client unavailable rather than failing:
    /// the subsystem must start up even if the ledger is down.
    pub fn connect(backend: Arc<dyn LedgerBackend>, config: LedgerConfig) -> Self {
        let (connected, connect_error) = match backend.head() {
            Ok(head) => {
                tracing::info!(
                    endpoint = %config.endpoint,
                    network_id = %head.network_id,
                    sequence_number = head.sequence_number,
                    "ledger connected"
                );
                (true, None)
            }
            Err(err) => {
                tracing::warn!(
                    endpoint = %config.endpoint,
                    error = %err,
                    "ledger unreachable at startup; continuing unavailable"
                );
                (false, Some(err.to_string()))
            }
        };
        Self {
            backend,
            config,
            connected,
            connect_error,
            signer: OnceLock::new(),
        }
    }

    /// Batch size limit this client enforces.
    pub fn max_batch(&self) -> usize {
        self.config.max_batch
    }

    fn require_connection(&self) -> Result<(), LedgerError> {
        if self.connected {
            return Ok(());
        }
        Err(LedgerError::Unavailable(
            self.connect_error
                .clone()
                .unwrap_or_else(|| "no connection established".into()),
        ))
    }

    /// Lazily materializes the write-capable signer from configured secret
    /// material. Idempotent: the first successful derivation wins and every
    /// later caller reuses it.
    pub fn ensure_signer(&self) -> Result<&SignerIdentity, LedgerError> {
        self.require_connection()?;
        if let Some(signer) = self.signer.get() {
            return Ok(signer);
        }
        let candidate = SignerIdentity::from_seed(&self.config.signer_seed)?;
        Ok(self.signer.get_or_init(|| candidate))
    }

    /// Submits one record and awaits confirmation.
    pub fn write_single(
        &self,
        subject: &PseudonymousAddress,
        fingerprint: Fingerprint,
        incident_id: IncidentId,
    ) -> Result<WriteReceipt, LedgerError> {
        let entries = vec![LedgerEntry {
            fingerprint,
            incident_id,
        }];
        self.submit_with_retry(subject, &entries)
    }

    /// Submits multiple records as one all-or-nothing transaction, purely
    /// to amortize per-write overhead. Fingerprints and incident ids are
    /// paired positionally and must have equal lengths within the
    /// configured batch bound.
    pub fn write_batch(
        &self,
        subject: &PseudonymousAddress,
        fingerprints: Vec<Fingerprint>,
        incident_ids: Vec<IncidentId>,
    ) -> Result<WriteReceipt, LedgerError> {
        if fingerprints.len() != incident_ids.len() {
            return Err(ValidationError::LengthMismatch {
                left: "fingerprints",
                left_len: fingerprints.len(),
                right: "incidentIds",
                right_len: incident_ids.len(),
            }
            .into());
        }
        let len = fingerprints.len();
        if len < 1 || len > self.config.max_batch {
            return Err(ValidationError::BatchSize {
                len,
                min: 1,
                max: self.config.max_batch,
            }
            .into());
        }
        let entries: Vec<LedgerEntry> = fingerprints
            .into_iter()
            .zip(incident_ids)
            .map(|(fingerprint, incident_id)| LedgerEntry {
                fingerprint,
                incident_id,
            })
            .collect();
        self.submit_with_retry(subject, &entries)
    }

    fn submit_with_retry(
        &self,
        subject: &PseudonymousAddress,
        entries: &[LedgerEntry],
    ) -> Result<WriteReceipt, LedgerError> {
        let signer = self.ensure_signer()?;
        let max_attempts = self.config.retry.max_attempts.max(1);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.backend.submit(signer, subject, entries) {
                Ok(receipt) => {
                    tracing::info!(
                        subject = %subject,
                        entries = entries.len(),
                        sequence_number = receipt.sequence_number,
                        "ledger write confirmed"
                    );
                    return Ok(receipt);
                }
                // Only submission failures are retried; validation and
                // availability errors surface immediately.
                Err(LedgerError::Transaction(reason)) if attempt < max_attempts => {
                    tracing::warn!(attempt, reason = %reason, "ledger submission failed; retrying");
                    std::thread::sleep(self.config.retry.backoff * attempt);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Returns true iff a record with exactly this (subject, fingerprint)
    /// pair attributes the access to the reader.
    pub fn verify_access(
        &self,
        subject: &PseudonymousAddress,
        fingerprint: &Fingerprint,
        reader: &PseudonymousAddress,
    ) -> Result<bool, LedgerError> {
        self.require_connection()?;
        self.backend.attributes_access(subject, fingerprint, reader)
    }

    /// Reads a page of records for a subject in ledger-insertion order.
    /// `offset` defaults to 0 and `limit` to [`DEFAULT_PAGE_LIMIT`]; each
    /// record's native integer timestamp is translated to an instant.
    pub fn query_records(
        &self,
        subject: &PseudonymousAddress,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<LedgerRecord>, LedgerError> {
        self.require_connection()?;
        let offset = offset.unwrap_or(0);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if limit < 1 {
            return Err(ValidationError::OutOfRange {
                field: "limit",
                value: 0.0,
                min: 1.0,
                max: f64::INFINITY,
            }
            .into());
        }
        let raw = self.backend.records(subject, offset, limit)?;
        Ok(raw
            .into_iter()
            .map(|record| LedgerRecord {
                timestamp: DateTime::<Utc>::from_timestamp(record.timestamp_secs as i64, 0)
                    .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH),
                fingerprint: record.fingerprint,
                reader_address: record.reader_address,
                incident_id: record.incident_id,
            })
            .collect())
    }

    /// Delegates to the authorized-reader registry the ledger maintains.
    pub fn is_authorized_reader(
        &self,
        reader: &PseudonymousAddress,
    ) -> Result<bool, LedgerError> {
        self.require_connection()?;
        self.backend.is_authorized_reader(reader)
    }

    /// Reports connectivity. Never fails: an unreachable ledger becomes a
    /// `connected: false` report with the error attached.
    pub fn connection_status(&self) -> ConnectionStatus {
        if !self.connected {
            return ConnectionStatus {
                connected: false,
                sequence_number: None,
                network_id: None,
                error: self.connect_error.clone(),
            };
        }
        match self.backend.head() {
            Ok(head) => ConnectionStatus {
                connected: true,
                sequence_number: Some(head.sequence_number),
                network_id: Some(head.network_id),
                error: None,
            },
            Err(err) => ConnectionStatus {
                connected: false,
                sequence_number: None,
                network_id: None,
                error: Some(err.to_string()),
            },
        }
    }
}
