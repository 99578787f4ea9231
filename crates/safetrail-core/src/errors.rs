use safetrail_canonical::ValidationError;
use thiserror::Error;

/// Access-side error taxonomy.
///
/// Ledger-side failures (`Unavailable`, `Transaction`) live in
/// `safetrail-ledger`; the access services translate them into response
/// envelopes or, inside the emergency workflow, into warnings.
#[derive(Error, Debug)]
pub enum AccessError {
    /// Malformed input, rejected before any I/O.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Bad API key, unknown service, or jurisdiction/type mismatch.
    ///
    /// One variant and one message for all three causes: differentiated
    /// errors would let a caller enumerate valid service IDs.
    #[error("invalid emergency service credentials")]
    InvalidCredential,
    /// Credential authentication failed during an access request.
    #[error("authentication failed")]
    AuthenticationFailed,
    /// The user's privacy policy refuses emergency access.
    #[error("emergency access disabled for this user")]
    AccessDenied,
    /// No active location share exists for the user.
    #[error("no location data available for user")]
    NoLocationData,
    /// Local audit-store failure. Always fatal, never swallowed: if the
    /// system cannot record that an attempt occurred, it must not proceed.
    #[error("internal error: {0}")]
    Internal(String),
}
