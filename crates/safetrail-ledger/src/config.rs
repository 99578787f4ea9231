use std::time::Duration;

/// Bounded retry policy for ledger submissions.
///
/// Applies only to [`LedgerError::Transaction`](crate::LedgerError);
/// validation and credential failures are never retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Base delay between attempts; grows linearly with the attempt count.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(50),
        }
    }
}

/// Ledger client configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Ledger endpoint the backend connects to.
    pub endpoint: String,
    /// Secret material the write-capable signer is derived from.
    pub signer_seed: String,
    /// Maximum entries per batch write. A limit, not a constant: ledgers
    /// with different per-write overhead tune it differently.
    pub max_batch: usize,
    /// Retry policy for failed submissions.
    pub retry: RetryPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8545".into(),
            // Development-only seed, matching the fixture accounts used by
            // local ledger nodes. Production deployments must configure
            // real secret material via the environment.
            signer_seed: "safetrail-dev-signer".into(),
            max_batch: 50,
            retry: RetryPolicy::default(),
        }
    }
}

impl LedgerConfig {
    /// Builds a configuration from the environment, falling back to the
    /// development defaults for anything unset:
    /// `SAFETRAIL_LEDGER_ENDPOINT`, `SAFETRAIL_SIGNER_SEED`,
    /// `SAFETRAIL_MAX_BATCH`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_batch = std::env::var("SAFETRAIL_MAX_BATCH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|v| *v >= 1)
            .unwrap_or(defaults.max_batch);
        Self {
            endpoint: std::env::var("SAFETRAIL_LEDGER_ENDPOINT").unwrap_or(defaults.endpoint),
            signer_seed: std::env::var("SAFETRAIL_SIGNER_SEED").unwrap_or(defaults.signer_seed),
            max_batch,
            retry: defaults.retry,
        }
    }
}
