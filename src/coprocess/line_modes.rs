//! Single-threaded line modes: echo, filter, transform, log and alert.
//!
//! Each mode is one blocking read loop over stdin lines with per-line flushing. The loops
//! stop early once shutdown has been requested.

use chrono::Utc;
use regex::Regex;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use super::session_log::SessionLog;
use super::text::{KeywordMatcher, Transform, read_lines_lossy};
use crate::shutdown::Shutdown;

/// Feed each line to `handle` until end of input or shutdown.
fn for_each_line<R, F>(input: R, shutdown: &Shutdown, mut handle: F) -> io::Result<()>
where
    R: BufRead,
    F: FnMut(&str) -> io::Result<()>,
{
    for line in read_lines_lossy(input) {
        let line = line?;
        if shutdown.is_triggered() {
            break;
        }
        handle(&line)?;
    }
    Ok(())
}

fn emit<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    writeln!(out, "{text}")?;
    out.flush()
}

/// `[<prefix>] <line>` for every input line.
pub fn echo<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    prefix: &str,
    shutdown: &Shutdown,
) -> io::Result<()> {
    for_each_line(input, shutdown, |line| emit(out, &format!("[{prefix}] {line}")))
}

/// Pass through only lines matching `pattern`.
pub fn filter<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    pattern: &Regex,
    shutdown: &Shutdown,
) -> io::Result<()> {
    for_each_line(input, shutdown, |line| {
        if pattern.is_match(line) {
            emit(out, line)?;
        }
        Ok(())
    })
}

/// Strip ANSI sequences from every line, then apply `transform`.
pub fn transform<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    transform: Transform,
    shutdown: &Shutdown,
) -> io::Result<()> {
    for_each_line(input, shutdown, |line| emit(out, &transform.apply(line)))
}

/// Append every line to the session log.
///
/// The log is shared with the shutdown hook so an interrupt still writes the end marker.
pub fn log_lines<R: BufRead>(
    input: R,
    session: Arc<Mutex<SessionLog>>,
    shutdown: &Shutdown,
) -> io::Result<()> {
    let hook_session = Arc::clone(&session);
    shutdown.on_shutdown(move || {
        if let Err(e) = hook_session.lock().close() {
            log::warn!("failed to close session log on interrupt: {}", e);
        }
    });
    for_each_line(input, shutdown, |line| session.lock().write_line(line))?;
    session.lock().close()
}

/// Alert line for the first keyword found in `line`, if any.
pub fn alert_for(matcher: &KeywordMatcher, line: &str) -> Option<String> {
    matcher.first_match(line).map(|keyword| {
        format!(
            "[ALERT {}] matched '{}': {}",
            Utc::now().format("%H:%M:%S"),
            keyword,
            line.trim_end()
        )
    })
}

/// Emit at most one alert per line.
pub fn alert<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    matcher: &KeywordMatcher,
    shutdown: &Shutdown,
) -> io::Result<()> {
    emit(
        out,
        &format!("[alert] Watching for: {}", matcher.keywords().join(", ")),
    )?;
    for_each_line(input, shutdown, |line| match alert_for(matcher, line) {
        Some(alert) => emit(out, &alert),
        None => Ok(()),
    })
}
