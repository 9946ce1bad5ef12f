//! Startup configuration errors.
//!
//! These are fatal: they are reported on stderr and the tool exits non-zero before any
//! input is read.

/// Invalid mode configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Alert mode needs at least one non-blank keyword.
    #[error("No keywords specified")]
    NoKeywords,
    /// The filter pattern is not a valid regular expression.
    #[error("invalid filter pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// Reporting intervals must be positive and finite.
    #[error("invalid interval {0}: must be a positive number of seconds")]
    InvalidInterval(f64),
}
