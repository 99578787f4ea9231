//! Verify command implementation.

use safetrail_canonical::{compute_fingerprint, LocationData};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::fingerprint::read_input;

/// An exported record: the access instant plus the fingerprint that was
/// written to the ledger for it.
#[derive(Deserialize)]
struct RecordedAccess {
    #[serde(flatten)]
    location: LocationData,
    timestamp: DateTime<Utc>,
    fingerprint: String,
}

fn matches(raw: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let record: RecordedAccess =
        serde_json::from_str(raw).map_err(|e| format!("Invalid JSON: {}", e))?;
    record
        .location
        .validate()
        .map_err(|e| format!("Invalid location: {}", e))?;
    let computed = compute_fingerprint(&record.location, record.timestamp)
        .map_err(|e| format!("Fingerprinting failed: {}", e))?;
    Ok(computed.b64 == record.fingerprint)
}

pub fn run(input: Option<String>, strict: bool) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_input(input)?;
    let ok = matches(&raw)?;

    println!("{}", if ok { "OK" } else { "MISMATCH" });
    if strict && !ok {
        std::process::exit(1);
    }
    Ok(())
}
