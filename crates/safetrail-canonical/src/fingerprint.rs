//! Fingerprint computation with domain-separated hashing.
//!
//! Fingerprints are computed as: `sha256(domain_separator || canonical_bytes)`
//! over the canonical JSON form of `{lat, lng, precision, timestamp}`. The
//! timestamp is serialized as UTC ISO-8601 with millisecond precision so that
//! implementations on either side of the ledger derive identical commitments.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use sha2::{Digest as Sha2Digest, Sha256};

use crate::digest::{DigestAlg, Fingerprint};
use crate::location::LocationData;

/// Domain separator for fingerprint computation: `b"safetrail:fingerprint:v1\0"`.
///
/// Distinct from the address separator so the two derivations can never
/// collide cross-purpose.
const FINGERPRINT_DOMAIN_SEPARATOR: &[u8] = b"safetrail:fingerprint:v1\0";

/// Serializes an instant in the canonical form used for hashing:
/// UTC, millisecond precision, `Z` suffix.
pub fn canonical_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Computes the fingerprint committing to a location-access event.
///
/// Field order is fixed by the canonical JSON profile (RFC 8785 sorts
/// object members), and all numbers are stringified before
/// canonicalization so float formatting cannot vary across platforms.
/// Identical logical inputs always yield the identical fingerprint; any
/// field change yields a different one. No collision resistance beyond
/// SHA-256 is claimed.
///
/// # Errors
///
/// Returns [`FingerprintError`] if canonicalization fails.
pub fn compute_fingerprint(
    location: &LocationData,
    timestamp: DateTime<Utc>,
) -> Result<Fingerprint, FingerprintError> {
    let mut value = json!({
        "lat": location.lat,
        "lng": location.lng,
        "precision": location.precision,
        "timestamp": canonical_timestamp(timestamp),
    });

    // Stringify all JSON numbers so canonical bytes never depend on
    // float-to-decimal formatting.
    stringify_numbers(&mut value);

    let canonical = canonical_json::to_string(&value)
        .map_err(|err| FingerprintError::Canonicalization(err.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(FINGERPRINT_DOMAIN_SEPARATOR);
    hasher.update(canonical.as_bytes());
    let hash_bytes = hasher.finalize();

    use base64::Engine;
    let b64 = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash_bytes);
    Ok(Fingerprint::new(DigestAlg::Sha256, b64)?)
}

/// Error during fingerprint computation.
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    /// Canonicalization failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(String),
    /// Digest construction failed.
    #[error("digest construction failed: {0}")]
    Digest(#[from] crate::ValidationError),
}

/// Recursively converts all JSON numbers into strings.
fn stringify_numbers(value: &mut Value) {
    match value {
        Value::Number(n) => {
            let s = n.to_string();
            *value = Value::String(s);
        }
        Value::Array(arr) => {
            for v in arr {
                stringify_numbers(v);
            }
        }
        Value::Object(map) => {
            for v in map.values_mut() {
                stringify_numbers(v);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Precision;
    use chrono::TimeZone;

    fn sample() -> (LocationData, DateTime<Utc>) {
        let location = LocationData::new(40.7128, -74.006, Precision::Exact).unwrap();
        let ts = Utc.with_ymd_and_hms(2023, 12, 1, 10, 0, 0).unwrap();
        (location, ts)
    }

    #[test]
    fn identical_inputs_yield_identical_fingerprints() {
        let (location, ts) = sample();
        let a = compute_fingerprint(&location, ts).unwrap();
        let b = compute_fingerprint(&location, ts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn any_field_change_yields_a_different_fingerprint() {
        let (location, ts) = sample();
        let base = compute_fingerprint(&location, ts).unwrap();

        let moved_lat = LocationData::new(40.7129, location.lng, location.precision).unwrap();
        assert_ne!(base, compute_fingerprint(&moved_lat, ts).unwrap());

        let moved_lng = LocationData::new(location.lat, -74.0061, location.precision).unwrap();
        assert_ne!(base, compute_fingerprint(&moved_lng, ts).unwrap());

        let coarser = LocationData::new(location.lat, location.lng, Precision::General).unwrap();
        assert_ne!(base, compute_fingerprint(&coarser, ts).unwrap());

        let later = ts + chrono::Duration::milliseconds(1);
        assert_ne!(base, compute_fingerprint(&location, later).unwrap());
    }

    #[test]
    fn canonical_timestamp_uses_millisecond_precision() {
        let ts = Utc.with_ymd_and_hms(2023, 12, 1, 10, 0, 0).unwrap();
        assert_eq!(canonical_timestamp(ts), "2023-12-01T10:00:00.000Z");
    }

    #[test]
    fn sub_millisecond_differences_do_not_change_the_fingerprint() {
        let (location, ts) = sample();
        let a = compute_fingerprint(&location, ts).unwrap();
        let b = compute_fingerprint(&location, ts + chrono::Duration::microseconds(400)).unwrap();
        assert_eq!(a, b);
    }
}
