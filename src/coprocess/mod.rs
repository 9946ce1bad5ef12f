//! Coprocess text modes.
//!
//! A coprocess receives a copy of the terminal's output on stdin, one raw text line at a
//! time, and its stdout is read back by the terminal. Nothing here speaks JSON.
//!
//! | mode | behaviour |
//! |------|-----------|
//! | echo | prefix every line |
//! | filter | pass through lines matching a regex |
//! | transform | strip ANSI, then upper/lower/reverse |
//! | log | append timestamped lines to a file |
//! | periodic | heartbeat on a timer, stdin drained and discarded |
//! | counter | count lines, report on a timer and at end of input |
//! | alert | one alert line per line containing a keyword |

pub mod line_modes;
pub mod session_log;
pub mod text;
pub mod timers;

use parking_lot::Mutex;
use regex::{Regex, RegexBuilder};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::{CoprocessCli, CoprocessMode};
use crate::error::ConfigError;
use crate::observer::parse_interval;
use crate::shutdown::{Shutdown, is_broken_pipe};
use session_log::{SessionLog, expand_home};
use text::{KeywordMatcher, Transform};

/// Validated configuration for the selected mode.
#[derive(Debug, Clone)]
pub enum CoprocessConfig {
    Echo { prefix: String },
    Filter { pattern: Regex },
    Transform(Transform),
    Log { path: PathBuf },
    Periodic { interval: Duration },
    Counter { interval: Duration },
    Alert { keywords: KeywordMatcher },
}

impl CoprocessConfig {
    /// Validate the flags the selected mode uses; flags for other modes are ignored.
    pub fn from_cli(cli: &CoprocessCli) -> Result<Self, ConfigError> {
        Ok(match cli.mode {
            CoprocessMode::Echo => Self::Echo {
                prefix: cli.prefix.clone(),
            },
            CoprocessMode::Filter => Self::Filter {
                pattern: RegexBuilder::new(&cli.pattern)
                    .case_insensitive(cli.ignore_case)
                    .build()
                    .map_err(|source| ConfigError::InvalidPattern {
                        pattern: cli.pattern.clone(),
                        source,
                    })?,
            },
            CoprocessMode::Transform => Self::Transform(cli.transform.into()),
            CoprocessMode::Log => Self::Log {
                path: expand_home(&cli.logfile),
            },
            CoprocessMode::Periodic => Self::Periodic {
                interval: parse_interval(cli.interval)?,
            },
            CoprocessMode::Counter => Self::Counter {
                interval: parse_interval(cli.interval)?,
            },
            CoprocessMode::Alert => Self::Alert {
                keywords: KeywordMatcher::parse(&cli.keywords).ok_or(ConfigError::NoKeywords)?,
            },
        })
    }

    pub fn mode(&self) -> CoprocessMode {
        match self {
            Self::Echo { .. } => CoprocessMode::Echo,
            Self::Filter { .. } => CoprocessMode::Filter,
            Self::Transform(_) => CoprocessMode::Transform,
            Self::Log { .. } => CoprocessMode::Log,
            Self::Periodic { .. } => CoprocessMode::Periodic,
            Self::Counter { .. } => CoprocessMode::Counter,
            Self::Alert { .. } => CoprocessMode::Alert,
        }
    }
}

/// Run the selected mode between the start and exit banners.
///
/// A closed stdout is a normal shutdown and returns `Ok`.
pub fn run_coprocess<R, W>(
    config: &CoprocessConfig,
    input: R,
    mut out: W,
    shutdown: &Shutdown,
) -> io::Result<()>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    let result = writeln!(
        out,
        "[coprocess] started in '{}' mode",
        config.mode().name()
    )
    .and_then(|()| out.flush())
    .and_then(|()| run_mode(config, input, &mut out, shutdown));

    match result {
        Err(e) if is_broken_pipe(&e) => {
            log::info!("stdout closed, exiting");
            Ok(())
        }
        other => {
            let _ = writeln!(out, "[coprocess] exiting").and_then(|()| out.flush());
            other
        }
    }
}

fn run_mode<R, W>(
    config: &CoprocessConfig,
    input: R,
    out: &mut W,
    shutdown: &Shutdown,
) -> io::Result<()>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    match config {
        CoprocessConfig::Echo { prefix } => line_modes::echo(input, out, prefix, shutdown),
        CoprocessConfig::Filter { pattern } => line_modes::filter(input, out, pattern, shutdown),
        CoprocessConfig::Transform(t) => line_modes::transform(input, out, *t, shutdown),
        CoprocessConfig::Log { path } => {
            writeln!(out, "Logging to {}", path.display())?;
            out.flush()?;
            let session = Arc::new(Mutex::new(SessionLog::open(path)?));
            line_modes::log_lines(input, session, shutdown)
        }
        CoprocessConfig::Periodic { interval } => {
            timers::periodic_mode(input, out, *interval, shutdown).map(|beats| {
                log::debug!("periodic mode stopped after {} heartbeats", beats);
            })
        }
        CoprocessConfig::Counter { interval } => {
            timers::counter_mode(input, out, *interval, shutdown).map(|count| {
                log::debug!("counter mode counted {} lines", count);
            })
        }
        CoprocessConfig::Alert { keywords } => line_modes::alert(input, out, keywords, shutdown),
    }
}
