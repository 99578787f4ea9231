//! Append-only ledger client for safetrail access fingerprints.
//!
//! This crate provides:
//! - `LedgerBackend` trait abstracting the append-only system of record
//! - In-memory backend with failure injection for tests
//! - `LedgerClient`: connection lifecycle, lazily memoized signer,
//!   single/batch writes with bounded retry, paginated reads
//!
//! Core invariants:
//! - The subsystem starts even when the ledger is down; every operation on
//!   an unconnected client fails with `LedgerError::Unavailable` instead of
//!   crashing, and `connection_status` never fails at all
//! - Batch writes are all-or-nothing; partial success cannot occur
//! - Records are never mutated or deleted, and reads return them in
//!   ledger-insertion order
//!
#![deny(missing_docs)]

/// Ledger client implementation.
pub mod client;
/// Client and retry configuration.
pub mod config;
/// Error types for ledger operations.
pub mod errors;
/// In-memory ledger backend.
pub mod memory;
/// Record shapes and the backend trait.
pub mod record;
/// Write-capable signer identity.
pub mod signer;

pub use client::{LedgerClient, DEFAULT_PAGE_LIMIT};
pub use config::{LedgerConfig, RetryPolicy};
pub use errors::LedgerError;
pub use memory::InMemoryLedger;
pub use record::{
    ChainHead, ConnectionStatus, LedgerBackend, LedgerEntry, LedgerRecord, RawRecord, WriteReceipt,
};
pub use signer::SignerIdentity;
