//! Fingerprint command implementation.

use chrono::{DateTime, Utc};
use safetrail_canonical::{compute_fingerprint, Fingerprint, LocationData};
use serde::Deserialize;
use std::io::{self, Read};

/// One location-access instant as exported JSON:
/// `{"lat": .., "lng": .., "precision": "EXACT", "timestamp": "..."}`.
#[derive(Deserialize)]
pub(crate) struct AccessInstant {
    #[serde(flatten)]
    pub location: LocationData,
    pub timestamp: DateTime<Utc>,
}

pub(crate) fn read_input(input: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(path) = input {
        Ok(std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read file {}: {}", path, e))?)
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}

pub(crate) fn fingerprint_instant(raw: &str) -> Result<Fingerprint, Box<dyn std::error::Error>> {
    let instant: AccessInstant =
        serde_json::from_str(raw).map_err(|e| format!("Invalid JSON: {}", e))?;
    instant
        .location
        .validate()
        .map_err(|e| format!("Invalid location: {}", e))?;
    let fingerprint = compute_fingerprint(&instant.location, instant.timestamp)
        .map_err(|e| format!("Fingerprinting failed: {}", e))?;
    Ok(fingerprint)
}

pub fn run(input: Option<String>, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_input(input)?;
    let fingerprint = fingerprint_instant(&raw)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&fingerprint)?);
    } else {
        println!("{}", fingerprint);
    }
    Ok(())
}
