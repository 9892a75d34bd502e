use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Read a typed JSON document from stdin when data is being piped.
/// Returns None when stdin is a TTY (interactive) or carries no data, so
/// the caller can report which input it expected.
pub fn read_typed<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: T = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse stdin as JSON: {}", e))?;
    Ok(Some(value))
}
