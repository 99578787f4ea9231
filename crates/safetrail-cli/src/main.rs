//! Safetrail CLI - offline fingerprint and address tooling.
//!
//! Everything here is pure computation over the canonical forms; no ledger
//! connection is needed, so the commands work against exported records.

use clap::{Parser, Subcommand};

mod commands;

use commands::{address, fingerprint, verify};

#[derive(Parser)]
#[command(name = "safetrail")]
#[command(about = "Safetrail location-access fingerprint tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the fingerprint for a location-access instant
    Fingerprint {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Output the full digest object as JSON
        #[arg(long)]
        json: bool,
    },
    /// Derive the pseudonymous ledger address for a user id
    Address {
        /// User identifier
        user_id: String,
    },
    /// Recompute a recorded fingerprint and compare
    Verify {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Exit with error code on mismatch
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fingerprint { input, json } => fingerprint::run(input, json),
        Commands::Address { user_id } => address::run(user_id),
        Commands::Verify { input, strict } => verify::run(input, strict),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
