pub mod bakery;
pub mod chat;
pub mod profile;
pub mod session;

use anyhow::Result;
use serde::Serialize;

/// Prints store state as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
