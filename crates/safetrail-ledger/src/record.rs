use chrono::{DateTime, Utc};
use safetrail_canonical::{Fingerprint, IncidentId, PseudonymousAddress};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;
use crate::signer::SignerIdentity;

/// One entry submitted to the ledger: a fingerprint plus the incident it
/// belongs to. The subject address is carried alongside, once per write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Content commitment over the access event.
    pub fingerprint: Fingerprint,
    /// Incident the access belongs to.
    pub incident_id: IncidentId,
}

/// Record as the ledger stores it, with the native integer timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// Content commitment over the access event.
    pub fingerprint: Fingerprint,
    /// Address the access is attributed to (the writing signer).
    pub reader_address: PseudonymousAddress,
    /// Incident the access belongs to.
    pub incident_id: IncidentId,
    /// Ledger-native timestamp, seconds since the Unix epoch.
    pub timestamp_secs: u64,
}

/// Append-only ledger record translated for application use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    /// Content commitment over the access event.
    pub fingerprint: Fingerprint,
    /// Address the access is attributed to.
    pub reader_address: PseudonymousAddress,
    /// Incident the access belongs to.
    pub incident_id: IncidentId,
    /// Ledger sequence timestamp, translated to an instant.
    pub timestamp: DateTime<Utc>,
}

/// Handle returned for a confirmed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteReceipt {
    /// Ledger-assigned record identifier.
    pub record_id: String,
    /// Sequence number the write landed at.
    pub sequence_number: u64,
}

/// Current ledger head, reported by a reachable backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHead {
    /// Latest sequence number.
    pub sequence_number: u64,
    /// Identifier of the ledger network.
    pub network_id: String,
}

/// Connection report. Building one never fails; an unreachable ledger is
/// reported, not raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    /// Whether the ledger is currently reachable.
    pub connected: bool,
    /// Latest sequence number, when reachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    /// Ledger network identifier, when reachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    /// Why the ledger is unreachable, when it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Append-only, tamper-evident system of record for access fingerprints.
///
/// Implementations confirm or fail each submission; once submitted, a
/// write runs to completion with no cancel-in-flight primitive. Within one
/// submission, entry order is preserved in the ledger's insertion order;
/// across concurrent submissions the ledger's own global append order
/// governs.
pub trait LedgerBackend: Send + Sync {
    /// Reports the current ledger head. Used as the connectivity probe.
    fn head(&self) -> Result<ChainHead, LedgerError>;

    /// Appends all entries under the subject address in one transaction
    /// and awaits confirmation. All-or-nothing by construction.
    fn submit(
        &self,
        signer: &SignerIdentity,
        subject: &PseudonymousAddress,
        entries: &[LedgerEntry],
    ) -> Result<WriteReceipt, LedgerError>;

    /// Reads records for a subject in ledger-insertion order.
    fn records(
        &self,
        subject: &PseudonymousAddress,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<RawRecord>, LedgerError>;

    /// Returns true iff a record under the subject carries exactly this
    /// fingerprint and attributes the access to the reader.
    fn attributes_access(
        &self,
        subject: &PseudonymousAddress,
        fingerprint: &Fingerprint,
        reader: &PseudonymousAddress,
    ) -> Result<bool, LedgerError>;

    /// Delegates to the authorized-reader registry the ledger maintains.
    fn is_authorized_reader(&self, reader: &PseudonymousAddress) -> Result<bool, LedgerError>;
}
