//! CLI subcommands.

pub mod inspect_log;
pub mod replay;

use std::error::Error;
use std::fs;
use std::path::Path;

/// Loads an operations file and normalizes it to a push request body.
///
/// Accepts either a bare JSON array of operations or a full
/// `{"operations": [...]}` envelope.
pub fn load_push_body(path: &Path) -> Result<Vec<u8>, Box<dyn Error>> {
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;

    let body = if value.is_array() {
        serde_json::json!({ "operations": value })
    } else {
        value
    };
    Ok(serde_json::to_vec(&body)?)
}
