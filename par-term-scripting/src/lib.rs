//! Script protocol for the par-term terminal emulator.
//!
//! Defines the line-delimited JSON contract between the terminal and script subprocesses:
//! the [`protocol`] types, the [`codec`] for single lines, and the [`stream`] adapters that
//! turn a reader into a sequence of events and a writer into a command sink.

pub mod codec;
pub mod error;
pub mod protocol;
pub mod stream;

pub use error::ProtocolError;
pub use protocol::{EventKind, ScriptCommand, ScriptEvent, ScriptEventData};
pub use stream::{CommandSink, EventSource};
