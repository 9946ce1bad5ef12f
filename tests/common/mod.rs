//! Shared integration test helpers for the script tools.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{observe, coprocess_output};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset of helpers is
//! used per file.

#![allow(dead_code)]

use par_term_script_tools::cli::ObserverMode;
use par_term_script_tools::coprocess::{CoprocessConfig, run_coprocess};
use par_term_script_tools::observer::{ObserverConfig, run_observer};
use par_term_script_tools::shutdown::Shutdown;
use par_term_scripting::ScriptCommand;
use par_term_scripting::codec::decode_command;
use std::io::Cursor;
use std::time::Duration;

/// Run the observer in `mode` over `input` and decode every emitted command.
pub fn observe(mode: ObserverMode, input: &str) -> Vec<ScriptCommand> {
    let mut config = ObserverConfig::new(mode);
    // Long enough that stress mode never reports mid-test.
    config.interval = Duration::from_secs(3600);
    let mut output = Vec::new();
    run_observer(
        &config,
        Cursor::new(input.as_bytes().to_vec()),
        &mut output,
        &Shutdown::new(),
    )
    .expect("observer run failed");
    decode_output(&output)
}

/// Decode a command stream; panics if any line is not a command.
pub fn decode_output(output: &[u8]) -> Vec<ScriptCommand> {
    String::from_utf8_lossy(output)
        .lines()
        .filter_map(|line| decode_command(line).expect("observer wrote an invalid command"))
        .collect()
}

/// All `Log` messages at `level`, in order.
pub fn logs_at<'a>(commands: &'a [ScriptCommand], level: &str) -> Vec<&'a str> {
    commands
        .iter()
        .filter_map(|c| match c {
            ScriptCommand::Log { level: l, message } if l == level => Some(message.as_str()),
            _ => None,
        })
        .collect()
}

/// Commands other than `Log`.
pub fn non_log(commands: &[ScriptCommand]) -> Vec<&ScriptCommand> {
    commands
        .iter()
        .filter(|c| !matches!(c, ScriptCommand::Log { .. }))
        .collect()
}

/// Run a coprocess mode over `input` to end of stream and return its stdout.
pub fn coprocess_output(config: &CoprocessConfig, input: &str) -> String {
    let mut output = Vec::new();
    run_coprocess(
        config,
        Cursor::new(input.as_bytes().to_vec()),
        &mut output,
        &Shutdown::new(),
    )
    .expect("coprocess run failed");
    String::from_utf8(output).expect("coprocess wrote invalid UTF-8")
}

/// Output lines between the start and exit banners.
pub fn body_lines(output: &str) -> Vec<&str> {
    output
        .lines()
        .filter(|l| !l.starts_with("[coprocess] "))
        .collect()
}
