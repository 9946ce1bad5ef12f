//! Monitor mode: logs every event and keeps a live status panel.

use std::collections::HashMap;
use std::io::Write;
use std::time::Instant;

use par_term_scripting::{CommandSink, EventKind, ProtocolError, ScriptCommand, ScriptEvent};
use serde_json::Value;

use super::{EventMode, failure_code, text_field, truncate_chars};

/// Panel refresh cadence, in events.
const PANEL_EVERY: u64 = 5;
/// Kinds listed in the panel.
const TOP_KINDS: usize = 5;
/// Payload preview length in the per-event debug log.
const PREVIEW_CHARS: usize = 120;

/// Event-kind frequency table that remembers first-seen order.
#[derive(Debug, Default, Clone)]
pub struct KindHistogram {
    counts: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl KindHistogram {
    pub fn record(&mut self, kind: &str) {
        match self.index.get(kind) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(kind.to_string(), self.counts.len());
                self.counts.push((kind.to_string(), 1));
            }
        }
    }

    pub fn count(&self, kind: &str) -> u64 {
        self.index.get(kind).map_or(0, |&i| self.counts[i].1)
    }

    /// The `n` most frequent kinds, ties kept in first-seen order.
    pub fn top(&self, n: usize) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> =
            self.counts.iter().map(|(k, c)| (k.as_str(), *c)).collect();
        // Stable sort keeps insertion order among equal counts.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

/// Accumulates an event histogram, the last cwd/title and a failure count.
pub struct MonitorMode {
    event_count: u64,
    kinds: KindHistogram,
    last_cwd: String,
    last_title: String,
    errors: u64,
    started: Instant,
}

impl MonitorMode {
    pub fn new() -> Self {
        Self {
            event_count: 0,
            kinds: KindHistogram::default(),
            last_cwd: "?".to_string(),
            last_title: "?".to_string(),
            errors: 0,
            started: Instant::now(),
        }
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// Markdown body of the status panel.
    pub fn summary(&self) -> String {
        let elapsed = self.started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            self.event_count as f64 / elapsed
        } else {
            0.0
        };
        let kind_lines = self
            .kinds
            .top(TOP_KINDS)
            .iter()
            .map(|(kind, count)| format!("  - `{kind}`: {count}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "## Monitor\n\
             - **Events**: {} ({:.1}/s)\n\
             - **Errors**: {}\n\
             - **CWD**: `{}`\n\
             - **Title**: {}\n\
             - **Top events**:\n{}\n",
            self.event_count, rate, self.errors, self.last_cwd, self.last_title, kind_lines
        )
    }

    fn update_panel<W: Write>(&self, sink: &mut CommandSink<W>) -> Result<(), ProtocolError> {
        sink.send(&ScriptCommand::set_panel("Monitor", self.summary()))
    }
}

impl Default for MonitorMode {
    fn default() -> Self {
        Self::new()
    }
}

impl EventMode for MonitorMode {
    fn start<W: Write>(&mut self, sink: &mut CommandSink<W>) -> Result<(), ProtocolError> {
        sink.log("info", "Monitor mode started")
    }

    fn on_event<W: Write>(
        &mut self,
        event: &ScriptEvent,
        sink: &mut CommandSink<W>,
    ) -> Result<(), ProtocolError> {
        self.event_count += 1;
        let kind = event.kind_or_unknown();
        self.kinds.record(kind);

        let payload = serde_json::to_string(&event.data).unwrap_or_default();
        sink.log(
            "debug",
            format!(
                "[{}] {}: {}",
                self.event_count,
                kind,
                truncate_chars(&payload, PREVIEW_CHARS)
            ),
        )?;

        let event_kind = event.event_kind();
        let data = event.data.fields();
        let or_unknown = |key: &str| match data.get(key).and_then(Value::as_str) {
            Some(value) => value.to_string(),
            None => "?".to_string(),
        };
        match &event_kind {
            EventKind::CwdChanged => {
                self.last_cwd = or_unknown("cwd");
                sink.log("info", format!("CWD -> {}", self.last_cwd))?;
            }
            EventKind::TitleChanged => {
                self.last_title = or_unknown("title");
            }
            EventKind::CommandComplete => {
                if let Some(code) = failure_code(data.get("exit_code")) {
                    self.errors += 1;
                    sink.log(
                        "warn",
                        format!(
                            "Command failed: {} (exit {code})",
                            text_field(&data, "command")
                        ),
                    )?;
                }
            }
            EventKind::BellRang => sink.log("info", "Bell rang")?,
            _ => {}
        }

        let important = matches!(
            event_kind,
            EventKind::CwdChanged | EventKind::CommandComplete | EventKind::BellRang
        );
        if self.event_count % PANEL_EVERY == 0 || important {
            self.update_panel(sink)?;
        }
        Ok(())
    }

    fn finish<W: Write>(&mut self, sink: &mut CommandSink<W>) -> Result<(), ProtocolError> {
        self.update_panel(sink)?;
        sink.log(
            "info",
            format!("Monitor ended after {} events", self.event_count),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use par_term_scripting::ScriptEventData;

    #[test]
    fn test_histogram_ties_keep_first_seen_order() {
        let mut h = KindHistogram::default();
        for kind in ["b", "a", "c", "a", "b", "d"] {
            h.record(kind);
        }
        assert_eq!(h.top(5), vec![("b", 2), ("a", 2), ("c", 1), ("d", 1)]);
        assert_eq!(h.top(1), vec![("b", 2)]);
        assert_eq!(h.count("a"), 2);
        assert_eq!(h.count("zzz"), 0);
    }

    #[test]
    fn test_histogram_top_caps_at_n() {
        let mut h = KindHistogram::default();
        for kind in ["k1", "k2", "k3", "k4", "k5", "k6", "k6"] {
            h.record(kind);
        }
        let top = h.top(5);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0], ("k6", 2));
        assert_eq!(top[4], ("k4", 1));
    }

    #[test]
    fn test_summary_defaults() {
        let summary = MonitorMode::new().summary();
        assert!(summary.starts_with("## Monitor\n"));
        assert!(summary.contains("- **Events**: 0 ("));
        assert!(summary.contains("- **CWD**: `?`"));
        assert!(summary.contains("- **Title**: ?"));
    }

    #[test]
    fn test_counts_events_and_failures() {
        let mut mode = MonitorMode::new();
        let mut sink = CommandSink::new(Vec::new());
        let events = [
            ScriptEvent::new("bell_rang", ScriptEventData::Empty),
            ScriptEvent::new(
                "command_complete",
                ScriptEventData::CommandComplete {
                    command: "make".to_string(),
                    exit_code: Some(2),
                },
            ),
            ScriptEvent::new(
                "command_complete",
                ScriptEventData::CommandComplete {
                    command: "ls".to_string(),
                    exit_code: Some(0),
                },
            ),
        ];
        for event in &events {
            mode.on_event(event, &mut sink).unwrap();
        }
        assert_eq!(mode.event_count(), 3);
        assert_eq!(mode.errors(), 1);
        assert!(mode.summary().contains("- **Errors**: 1"));
    }
}
