//! Diagnostic logging for the script tools.
//!
//! stdout belongs to the protocol, so `log::info!()` and friends are routed to stderr,
//! which the terminal captures as the script's error stream.
//!
//! The level is taken from, in order of precedence:
//! - the `--log-level` CLI flag
//! - `RUST_LOG` (a bare level name such as `debug`)
//! - `DEBUG_LEVEL` (0 = off, 1 = errors, 2 = info, 3 = debug, 4 = trace)
//!
//! With none of them set, nothing is logged.

use parking_lot::Mutex;
use std::io::Write;
use std::sync::OnceLock;

use log::{LevelFilter, Log, Metadata, Record};

struct StderrLogger {
    level: LevelFilter,
    // Serialises whole lines so concurrent threads never interleave mid-line.
    out: Mutex<()>,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record);
        let _guard = self.out.lock();
        let _ = std::io::stderr().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn format_line(record: &Record) -> String {
    format!(
        "[{}] [{:<5}] [{}] {}\n",
        chrono::Utc::now().format("%H:%M:%S%.6f"),
        record.level(),
        record.target(),
        record.args()
    )
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Map the numeric `DEBUG_LEVEL` convention onto a level filter.
pub fn level_from_debug_level(value: &str) -> Option<LevelFilter> {
    match value.trim().parse::<u8>().ok()? {
        0 => Some(LevelFilter::Off),
        1 => Some(LevelFilter::Error),
        2 => Some(LevelFilter::Info),
        3 => Some(LevelFilter::Debug),
        4 => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Resolve the effective level from the CLI override and the given environment values.
pub fn resolve_level(
    cli: Option<LevelFilter>,
    rust_log: Option<&str>,
    debug_level: Option<&str>,
) -> LevelFilter {
    cli.or_else(|| rust_log.and_then(|v| v.trim().parse::<LevelFilter>().ok()))
        .or_else(|| debug_level.and_then(level_from_debug_level))
        .unwrap_or(LevelFilter::Off)
}

/// Install the stderr log bridge. Safe to call more than once; only the first call wins.
pub fn init_log_bridge(cli_level: Option<LevelFilter>) {
    let level = resolve_level(
        cli_level,
        std::env::var("RUST_LOG").ok().as_deref(),
        std::env::var("DEBUG_LEVEL").ok().as_deref(),
    );
    let logger = LOGGER.get_or_init(|| StderrLogger {
        level,
        out: Mutex::new(()),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level);
    }
}
