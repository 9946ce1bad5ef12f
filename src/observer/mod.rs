//! Observer script mode engines.
//!
//! Each mode folds over the [`EventSource`] and drives the [`CommandSink`]. A mode is
//! chosen once at startup; its state lives in the mode value and is passed through the
//! processing loop, nothing is global.
//!
//! Lifecycle shared by every mode: `start` → `on_event` per decoded event → `finish` at end
//! of stream. A closed output pipe or an interrupt ends the loop early without `finish`.

pub mod demo;
pub mod monitor;
pub mod reactor;
pub mod stress;
pub mod validate;

use std::io::{BufRead, Write};
use std::time::Duration;

use par_term_scripting::{CommandSink, EventSource, ProtocolError, ScriptEvent};
use serde_json::{Map, Value};

use crate::cli::{ObserverCli, ObserverMode};
use crate::error::ConfigError;
use crate::shutdown::Shutdown;

pub use demo::DemoMode;
pub use monitor::MonitorMode;
pub use reactor::ReactorMode;
pub use stress::StressMode;
pub use validate::ValidateMode;

/// A stateful consumer of terminal events.
pub trait EventMode {
    /// Called once before the first event is read.
    fn start<W: Write>(&mut self, _sink: &mut CommandSink<W>) -> Result<(), ProtocolError> {
        Ok(())
    }

    /// Called for every decoded event, in arrival order.
    fn on_event<W: Write>(
        &mut self,
        event: &ScriptEvent,
        sink: &mut CommandSink<W>,
    ) -> Result<(), ProtocolError>;

    /// Called once at end of stream.
    fn finish<W: Write>(&mut self, _sink: &mut CommandSink<W>) -> Result<(), ProtocolError> {
        Ok(())
    }
}

/// Validated observer configuration.
#[derive(Debug, Clone)]
pub struct ObserverConfig {
    pub mode: ObserverMode,
    /// Stress mode reporting cadence.
    pub interval: Duration,
}

impl ObserverConfig {
    pub fn new(mode: ObserverMode) -> Self {
        Self {
            mode,
            interval: Duration::from_secs(2),
        }
    }

    pub fn from_cli(cli: &ObserverCli) -> Result<Self, ConfigError> {
        Ok(Self {
            mode: cli.mode,
            interval: parse_interval(cli.interval)?,
        })
    }
}

/// Convert a CLI interval in seconds into a non-zero duration.
pub fn parse_interval(seconds: f64) -> Result<Duration, ConfigError> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(ConfigError::InvalidInterval(seconds));
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| ConfigError::InvalidInterval(seconds))
}

/// Drive `mode` over every event from `source` until end of stream.
///
/// Malformed lines are reported with an error `Log` command and skipped. Returns early,
/// without calling `finish`, once `shutdown` has been triggered.
pub fn run_event_loop<M, R, W>(
    mode: &mut M,
    source: EventSource<R>,
    sink: &mut CommandSink<W>,
    shutdown: &Shutdown,
) -> Result<(), ProtocolError>
where
    M: EventMode,
    R: BufRead,
    W: Write,
{
    mode.start(sink)?;
    for item in source {
        if shutdown.is_triggered() {
            log::debug!("shutdown requested, leaving event loop");
            return Ok(());
        }
        match item {
            Ok(event) => mode.on_event(&event, sink)?,
            Err(e) if e.is_recoverable() => {
                sink.log("error", format!("Invalid JSON from terminal: {e}"))?;
            }
            Err(e) => return Err(e),
        }
    }
    mode.finish(sink)
}

/// Run the observer with the configured mode over `input`, writing commands to `output`.
///
/// Emits the startup and exit `Log` commands around the mode. A closed output pipe is a
/// normal shutdown and returns `Ok`.
pub fn run_observer<R: BufRead, W: Write>(
    config: &ObserverConfig,
    input: R,
    output: W,
    shutdown: &Shutdown,
) -> Result<(), ProtocolError> {
    let mut sink = CommandSink::new(output);
    let source = EventSource::new(input);

    let result = sink
        .log(
            "info",
            format!("script observer started in '{}' mode", config.mode.name()),
        )
        .and_then(|()| match config.mode {
            ObserverMode::Monitor => {
                run_event_loop(&mut MonitorMode::new(), source, &mut sink, shutdown)
            }
            ObserverMode::Command => {
                run_event_loop(&mut ReactorMode::new(), source, &mut sink, shutdown)
            }
            ObserverMode::Stress => run_event_loop(
                &mut StressMode::new(config.interval),
                source,
                &mut sink,
                shutdown,
            ),
            ObserverMode::Validate => {
                run_event_loop(&mut ValidateMode::new(), source, &mut sink, shutdown)
            }
            ObserverMode::Demo => run_event_loop(&mut DemoMode::new(), source, &mut sink, shutdown),
        });

    let result = match result {
        Err(e) if e.is_shutdown() => {
            log::info!("host closed the command pipe");
            return Ok(());
        }
        other => other,
    };
    if let Err(e) = &result {
        let _ = sink.log("error", format!("Observer stopped: {e}"));
    }
    let _ = sink.log("info", "script observer exiting");
    result
}

/// String field of a payload, empty when absent or not a string.
pub(crate) fn text_field<'a>(data: &'a Map<String, Value>, key: &str) -> &'a str {
    data.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Display form of a failing exit code: any present, non-null value other than `0`.
pub(crate) fn failure_code(exit_code: Option<&Value>) -> Option<String> {
    match exit_code? {
        Value::Null => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Truncate to at most `max` characters.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
