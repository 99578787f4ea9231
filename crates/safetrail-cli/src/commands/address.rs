//! Address command implementation.

use safetrail_canonical::{derive_address, UserId};

pub fn run(user_id: String) -> Result<(), Box<dyn std::error::Error>> {
    let user_id = UserId::parse(user_id).map_err(|e| format!("Invalid user id: {}", e))?;
    println!("{}", derive_address(&user_id));
    Ok(())
}
