//! Command-line interface for the observer script and the coprocess.
//!
//! Both tools select exactly one mode at startup; mode-specific flags are ignored by the
//! other modes.

use clap::Parser;
use std::path::PathBuf;

/// Observer script operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ObserverMode {
    /// Log all events and show a live status panel
    Monitor,
    /// React to events by sending commands back to the terminal
    Command,
    /// High-throughput event processing with timing metrics
    Stress,
    /// Validate the JSON protocol by echoing parsed event structure
    Validate,
    /// Interactive demo exercising all 9 command types
    Demo,
}

impl ObserverMode {
    pub fn name(self) -> &'static str {
        match self {
            ObserverMode::Monitor => "monitor",
            ObserverMode::Command => "command",
            ObserverMode::Stress => "stress",
            ObserverMode::Validate => "validate",
            ObserverMode::Demo => "demo",
        }
    }
}

/// Coprocess operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CoprocessMode {
    /// Echo stdin lines back with a prefix
    Echo,
    /// Pass through only lines matching a pattern (like grep)
    Filter,
    /// Transform stdin lines (uppercase, reverse, ...)
    Transform,
    /// Log all stdin to a file with timestamps
    Log,
    /// Ignore stdin and emit periodic heartbeat messages
    Periodic,
    /// Count lines received on stdin and report periodically
    Counter,
    /// Watch stdin for keywords and emit alert lines
    Alert,
}

impl CoprocessMode {
    pub fn name(self) -> &'static str {
        match self {
            CoprocessMode::Echo => "echo",
            CoprocessMode::Filter => "filter",
            CoprocessMode::Transform => "transform",
            CoprocessMode::Log => "log",
            CoprocessMode::Periodic => "periodic",
            CoprocessMode::Counter => "counter",
            CoprocessMode::Alert => "alert",
        }
    }
}

/// Line transform for transform mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TransformArg {
    Upper,
    Lower,
    Reverse,
    /// Only strip ANSI escape sequences
    Strip,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Observer script for par-term's scripting feature.
///
/// Receives terminal events as JSON on stdin (one object per line) and sends
/// commands as JSON on stdout (one object per line).
#[derive(Debug, Parser)]
#[command(name = "par-term-script-observer")]
#[command(author, version, about, long_about = None)]
pub struct ObserverCli {
    /// Operating mode
    #[arg(long, value_enum, default_value = "monitor")]
    pub mode: ObserverMode,

    /// Report interval in seconds for stress mode
    #[arg(long, value_name = "SECONDS", default_value_t = 2.0)]
    pub interval: f64,

    /// Diagnostic log level on stderr (overrides RUST_LOG and DEBUG_LEVEL)
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

/// Coprocess for par-term automation.
///
/// Receives terminal output on stdin; its stdout is read back by the terminal as
/// line-buffered text.
#[derive(Debug, Parser)]
#[command(name = "par-term-coprocess")]
#[command(author, version, about, long_about = None)]
pub struct CoprocessCli {
    /// Operating mode
    #[arg(long, value_enum, default_value = "echo")]
    pub mode: CoprocessMode,

    /// Prefix for echo mode
    #[arg(long, default_value = "COPROC")]
    pub prefix: String,

    /// Regex pattern for filter mode
    #[arg(long, default_value = "error")]
    pub pattern: String,

    /// Case-insensitive filter
    #[arg(long)]
    pub ignore_case: bool,

    /// Transform type for transform mode
    #[arg(long, value_enum, default_value = "strip")]
    pub transform: TransformArg,

    /// Log file path for log mode
    #[arg(long, value_name = "PATH", default_value = "/tmp/par_term_coproc.log")]
    pub logfile: PathBuf,

    /// Interval in seconds for periodic/counter modes
    #[arg(long, value_name = "SECONDS", default_value_t = 5.0)]
    pub interval: f64,

    /// Comma-separated keywords for alert mode
    #[arg(long, default_value = "error,fail,panic,warning")]
    pub keywords: String,

    /// Diagnostic log level on stderr (overrides RUST_LOG and DEBUG_LEVEL)
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observer_defaults() {
        let cli = ObserverCli::try_parse_from(["observer"]).unwrap();
        assert_eq!(cli.mode, ObserverMode::Monitor);
        assert_eq!(cli.interval, 2.0);
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_coprocess_defaults() {
        let cli = CoprocessCli::try_parse_from(["coprocess"]).unwrap();
        assert_eq!(cli.mode, CoprocessMode::Echo);
        assert_eq!(cli.prefix, "COPROC");
        assert_eq!(cli.pattern, "error");
        assert!(!cli.ignore_case);
        assert_eq!(cli.transform, TransformArg::Strip);
        assert_eq!(cli.logfile, PathBuf::from("/tmp/par_term_coproc.log"));
        assert_eq!(cli.interval, 5.0);
        assert_eq!(cli.keywords, "error,fail,panic,warning");
    }

    #[test]
    fn test_coprocess_flags() {
        let cli = CoprocessCli::try_parse_from([
            "coprocess",
            "--mode",
            "filter",
            "--pattern",
            "warn.*",
            "--ignore-case",
            "--interval",
            "0.5",
        ])
        .unwrap();
        assert_eq!(cli.mode, CoprocessMode::Filter);
        assert_eq!(cli.pattern, "warn.*");
        assert!(cli.ignore_case);
        assert_eq!(cli.interval, 0.5);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(ObserverCli::try_parse_from(["observer", "--mode", "bogus"]).is_err());
        assert!(CoprocessCli::try_parse_from(["coprocess", "--mode", "monitor"]).is_err());
    }
}
