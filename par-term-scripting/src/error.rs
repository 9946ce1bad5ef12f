//! Error types for the script protocol.

use std::io;

/// Errors produced while reading events or writing commands.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A line was not a valid event object. Recoverable: only that line is dropped.
    #[error("{message}")]
    Decode {
        /// Parser message describing the failure.
        message: String,
        /// The offending line.
        line: String,
    },
    /// A command could not be serialized.
    #[error("failed to serialize command: {0}")]
    Encode(#[from] serde_json::Error),
    /// The output consumer went away (broken pipe).
    #[error("output stream closed")]
    Closed,
    /// Any other I/O failure on the input or output stream.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl ProtocolError {
    /// Whether this error only affects a single input line.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Whether this error means the host went away and the script should shut down quietly.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl From<io::Error> for ProtocolError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::BrokenPipe {
            Self::Closed
        } else {
            Self::Io(e)
        }
    }
}
