// Library exports for the script observer and coprocess tools.
//
// Both binaries are thin wrappers: they parse their CLI, install the stderr log bridge,
// validate the mode configuration and then hand stdin/stdout to the engines below.
//
//   - `observer`: JSON protocol peer: reads terminal events, writes commands.
//   - `coprocess`: raw text filter over terminal output.
//
// Protocol types live in the `par-term-scripting` workspace crate.

/// Tool version (root crate version).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod coprocess;
pub mod debug;
pub mod error;
pub mod observer;
pub mod shutdown;
