use safetrail_ledger::{LedgerRecord, WriteReceipt};
use serde::{Deserialize, Serialize};

/// Uniform envelope for orchestrator operations: `{success, data?, error?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ServiceResponse<T> {
    /// Successful response carrying a payload.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed response carrying a message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Envelope for single/batch storage calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOutcome {
    /// Whether the write was confirmed.
    pub success: bool,
    /// Ledger record identifier, when confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    /// Sequence number the write landed at, when confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    /// Failure message otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreOutcome {
    /// Confirmed write.
    pub fn ok(receipt: WriteReceipt) -> Self {
        Self {
            success: true,
            record_id: Some(receipt.record_id),
            sequence_number: Some(receipt.sequence_number),
            error: None,
        }
    }

    /// Failed write.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            record_id: None,
            sequence_number: None,
            error: Some(error.into()),
        }
    }
}

/// Envelope for access verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOutcome {
    /// Whether the check itself ran.
    pub success: bool,
    /// Whether the (subject, fingerprint) pair attributes access to the
    /// reader. False whenever `success` is false.
    pub verified: bool,
    /// Failure message when the check could not run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Envelope for ledger audit-trail reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailOutcome {
    /// Whether the read succeeded.
    pub success: bool,
    /// Records in ledger-insertion order. Empty on failure.
    pub logs: Vec<LedgerRecord>,
    /// Failure message otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Envelope for authorized-reader checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedOutcome {
    /// Whether the check itself ran.
    pub success: bool,
    /// Whether the reader is on the ledger's registry. False whenever
    /// `success` is false.
    pub authorized: bool,
    /// Failure message when the check could not run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
