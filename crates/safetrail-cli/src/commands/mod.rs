//! Command implementations.

pub mod address;
pub mod fingerprint;
pub mod verify;
