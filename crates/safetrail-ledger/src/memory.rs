//! In-memory ledger backend.
//!
//! Reference implementation used by tests and local development. Keeps the
//! append-only contract of a real ledger: records are only ever appended,
//! a global sequence number advances per confirmed transaction, and reads
//! return insertion order. Failure injection covers the two error classes
//! a remote ledger exhibits: an unreachable endpoint and rejected
//! submissions.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use safetrail_canonical::{Fingerprint, PseudonymousAddress};
use sha2::{Digest as Sha2Digest, Sha256};

use crate::errors::LedgerError;
use crate::record::{ChainHead, LedgerBackend, LedgerEntry, RawRecord, WriteReceipt};
use crate::signer::SignerIdentity;

#[derive(Debug, Default)]
struct LedgerState {
    records: HashMap<String, Vec<RawRecord>>,
    sequence_number: u64,
    authorized_readers: HashSet<String>,
    unreachable: bool,
    failing_submissions: u32,
}

/// In-memory append-only ledger.
#[derive(Debug)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    network_id: String,
}

impl InMemoryLedger {
    /// Creates a reachable, empty ledger.
    pub fn new(network_id: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            network_id: network_id.into(),
        }
    }

    /// Creates a ledger whose endpoint never answers, for start-up
    /// degradation tests.
    pub fn unreachable() -> Self {
        let ledger = Self::new("unreachable");
        ledger.lock().unreachable = true;
        ledger
    }

    /// Marks a reader address as authorized.
    pub fn authorize_reader(&self, reader: &PseudonymousAddress) {
        self.lock()
            .authorized_readers
            .insert(reader.as_ref().to_string());
    }

    /// Makes the next `count` submissions fail with a transaction error.
    pub fn fail_next_submissions(&self, count: u32) {
        self.lock().failing_submissions = count;
    }

    /// Number of records stored under a subject.
    pub fn record_count(&self, subject: &PseudonymousAddress) -> usize {
        self.lock()
            .records
            .get(subject.as_ref())
            .map(Vec::len)
            .unwrap_or(0)
    }

    // A poisoned lock still guards consistent data here (no operation can
    // panic between mutations), so recover the guard instead of panicking.
    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn record_id(sequence_number: u64, subject: &PseudonymousAddress, entries: &[LedgerEntry]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sequence_number.to_be_bytes());
    hasher.update(subject.as_ref().as_bytes());
    for entry in entries {
        hasher.update(entry.fingerprint.b64.as_bytes());
    }
    format!("0x{}", hex::encode(hasher.finalize()))
}

impl LedgerBackend for InMemoryLedger {
    fn head(&self) -> Result<ChainHead, LedgerError> {
        let state = self.lock();
        if state.unreachable {
            return Err(LedgerError::Unavailable("endpoint unreachable".into()));
        }
        Ok(ChainHead {
            sequence_number: state.sequence_number,
            network_id: self.network_id.clone(),
        })
    }

    fn submit(
        &self,
        signer: &SignerIdentity,
        subject: &PseudonymousAddress,
        entries: &[LedgerEntry],
    ) -> Result<WriteReceipt, LedgerError> {
        let mut state = self.lock();
        if state.unreachable {
            return Err(LedgerError::Unavailable("endpoint unreachable".into()));
        }
        if state.failing_submissions > 0 {
            state.failing_submissions -= 1;
            return Err(LedgerError::Transaction("submission rejected".into()));
        }

        state.sequence_number += 1;
        let sequence_number = state.sequence_number;
        let timestamp_secs = Utc::now().timestamp().max(0) as u64;

        let stored = state.records.entry(subject.as_ref().to_string()).or_default();
        for entry in entries {
            stored.push(RawRecord {
                fingerprint: entry.fingerprint.clone(),
                reader_address: signer.address().clone(),
                incident_id: entry.incident_id.clone(),
                timestamp_secs,
            });
        }

        Ok(WriteReceipt {
            record_id: record_id(sequence_number, subject, entries),
            sequence_number,
        })
    }

    fn records(
        &self,
        subject: &PseudonymousAddress,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<RawRecord>, LedgerError> {
        let state = self.lock();
        if state.unreachable {
            return Err(LedgerError::Unavailable("endpoint unreachable".into()));
        }
        let stored = state.records.get(subject.as_ref());
        Ok(stored
            .map(|records| {
                records
                    .iter()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn attributes_access(
        &self,
        subject: &PseudonymousAddress,
        fingerprint: &Fingerprint,
        reader: &PseudonymousAddress,
    ) -> Result<bool, LedgerError> {
        let state = self.lock();
        if state.unreachable {
            return Err(LedgerError::Unavailable("endpoint unreachable".into()));
        }
        Ok(state
            .records
            .get(subject.as_ref())
            .map(|records| {
                records.iter().any(|record| {
                    &record.fingerprint == fingerprint && &record.reader_address == reader
                })
            })
            .unwrap_or(false))
    }

    fn is_authorized_reader(&self, reader: &PseudonymousAddress) -> Result<bool, LedgerError> {
        let state = self.lock();
        if state.unreachable {
            return Err(LedgerError::Unavailable("endpoint unreachable".into()));
        }
        Ok(state.authorized_readers.contains(reader.as_ref()))
    }
}
