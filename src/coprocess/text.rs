//! Text helpers for coprocess modes: ANSI stripping, line transforms and keyword matching.

use regex::Regex;
use std::borrow::Cow;
use std::io::{self, BufRead};
use std::sync::OnceLock;

use crate::cli::TransformArg;

/// CSI escape sequences (`ESC [ params letter`)
static ANSI_REGEX: OnceLock<Regex> = OnceLock::new();

fn ansi_regex() -> &'static Regex {
    ANSI_REGEX.get_or_init(|| {
        Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("ANSI regex is valid")
    })
}

/// Remove CSI escape sequences such as colour codes.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ansi_regex().replace_all(text, "")
}

/// Per-line transform applied after ANSI stripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Upper,
    Lower,
    Reverse,
    /// Only strip ANSI escape sequences.
    Strip,
}

impl From<TransformArg> for Transform {
    fn from(arg: TransformArg) -> Self {
        match arg {
            TransformArg::Upper => Transform::Upper,
            TransformArg::Lower => Transform::Lower,
            TransformArg::Reverse => Transform::Reverse,
            TransformArg::Strip => Transform::Strip,
        }
    }
}

impl Transform {
    pub fn apply(self, line: &str) -> String {
        let clean = strip_ansi(line);
        match self {
            Transform::Upper => clean.to_uppercase(),
            Transform::Lower => clean.to_lowercase(),
            Transform::Reverse => clean.chars().rev().collect(),
            Transform::Strip => clean.into_owned(),
        }
    }
}

/// Case-insensitive substring matcher over a keyword list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    /// Parse a comma-separated list; entries are trimmed and lower-cased, blanks dropped.
    ///
    /// Returns `None` when no keyword remains.
    pub fn parse(list: &str) -> Option<Self> {
        let keywords: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase)
            .collect();
        if keywords.is_empty() {
            None
        } else {
            Some(Self { keywords })
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// The first keyword, in list order, found in the ANSI-stripped line.
    pub fn first_match(&self, line: &str) -> Option<&str> {
        let clean = strip_ansi(line).to_lowercase();
        self.keywords
            .iter()
            .find(|k| clean.contains(k.as_str()))
            .map(String::as_str)
    }
}

/// Read `\n`-terminated lines, decoding invalid UTF-8 lossily.
///
/// The trailing `\n` is removed; anything else (including `\r`) is kept.
pub fn read_lines_lossy<R: BufRead>(mut reader: R) -> impl Iterator<Item = io::Result<String>> {
    let mut buf = Vec::new();
    std::iter::from_fn(move || {
        buf.clear();
        loop {
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None,
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Some(Ok(String::from_utf8_lossy(&buf).into_owned()))
    })
}
