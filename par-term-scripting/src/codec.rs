//! Line codec for the script protocol.
//!
//! Every message is a single compact JSON object terminated by `\n`. Blank lines are
//! ignored rather than treated as errors.

use crate::error::ProtocolError;
use crate::protocol::{ScriptCommand, ScriptEvent};

/// Decode one input line into an event.
///
/// Returns `Ok(None)` for empty or whitespace-only lines. Never panics, whatever the input.
pub fn decode_event(line: &str) -> Result<Option<ScriptEvent>, ProtocolError> {
    decode_line(line)
}

/// Decode one line into a command. Used by hosts and by tests.
pub fn decode_command(line: &str) -> Result<Option<ScriptCommand>, ProtocolError> {
    decode_line(line)
}

fn decode_line<T: serde::de::DeserializeOwned>(line: &str) -> Result<Option<T>, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| ProtocolError::Decode {
            message: e.to_string(),
            line: trimmed.to_string(),
        })
}

/// Encode a command as a newline-terminated JSON line.
pub fn encode_command(command: &ScriptCommand) -> Result<String, ProtocolError> {
    let mut json = serde_json::to_string(command)?;
    json.push('\n');
    Ok(json)
}

/// Encode an event as a newline-terminated JSON line (host side).
pub fn encode_event(event: &ScriptEvent) -> Result<String, ProtocolError> {
    let mut json = serde_json::to_string(event)?;
    json.push('\n');
    Ok(json)
}
