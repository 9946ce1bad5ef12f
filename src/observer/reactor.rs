//! Command mode: reacts to terminal events by sending commands back.

use std::collections::VecDeque;
use std::io::Write;

use par_term_scripting::{CommandSink, EventKind, ProtocolError, ScriptCommand, ScriptEvent};

use super::{EventMode, failure_code, text_field, truncate_chars};

/// Failures kept for the panel.
pub const FAILURE_HISTORY: usize = 10;
/// Environment values are shortened to this many characters in logs.
const ENV_VALUE_CHARS: usize = 50;

/// Maps event kinds to commands and tracks recent command failures.
#[derive(Debug, Default)]
pub struct ReactorMode {
    failures: VecDeque<String>,
    total_failures: u64,
}

impl ReactorMode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent failures, oldest first.
    pub fn recent_failures(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(String::as_str)
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    fn record_failure(&mut self, entry: String) {
        if self.failures.len() == FAILURE_HISTORY {
            self.failures.pop_front();
        }
        self.failures.push_back(entry);
        self.total_failures += 1;
    }

    fn failure_panel(&self) -> String {
        let lines = self
            .failures
            .iter()
            .map(|f| format!("  - {f}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("## Recent Failures\n{lines}")
    }
}

/// Badge for a working directory: its last path segment, or `/`.
pub fn cwd_badge(cwd: &str) -> &str {
    match cwd.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment,
        _ => "/",
    }
}

impl EventMode for ReactorMode {
    fn start<W: Write>(&mut self, sink: &mut CommandSink<W>) -> Result<(), ProtocolError> {
        sink.log("info", "Command mode started - reacting to terminal events")?;
        sink.send(&ScriptCommand::set_badge("CMD"))
    }

    fn on_event<W: Write>(
        &mut self,
        event: &ScriptEvent,
        sink: &mut CommandSink<W>,
    ) -> Result<(), ProtocolError> {
        // Fields are read from the raw payload so a partial one still gets a reaction.
        let data = event.data.fields();
        match event.event_kind() {
            EventKind::BellRang => {
                sink.send(&ScriptCommand::notify("Bell", "Terminal bell was triggered"))?;
                sink.log("info", "Sent notification for bell event")?;
            }
            EventKind::CwdChanged => {
                let cwd = text_field(&data, "cwd");
                sink.send(&ScriptCommand::set_variable("last_cwd", cwd))?;
                sink.send(&ScriptCommand::set_badge(cwd_badge(cwd)))?;
                sink.log(
                    "info",
                    format!("Updated badge and variable for CWD: {cwd}"),
                )?;
            }
            EventKind::CommandComplete => {
                let command = text_field(&data, "command");
                match failure_code(data.get("exit_code")) {
                    Some(code) => {
                        self.record_failure(format!("{command} (exit {code})"));
                        sink.send(&ScriptCommand::notify(
                            "Command Failed",
                            format!("`{command}` exited with code {code}"),
                        ))?;
                        sink.send(&ScriptCommand::set_badge(format!("FAIL:{code}")))?;
                        sink.log("error", format!("Command failed: {command} exit={code}"))?;
                    }
                    None if !command.is_empty() => {
                        sink.send(&ScriptCommand::set_badge("OK"))?;
                        sink.log("info", format!("Command succeeded: {command}"))?;
                    }
                    None => {}
                }
            }
            EventKind::TitleChanged => {
                sink.send(&ScriptCommand::set_variable(
                    "last_title",
                    text_field(&data, "title"),
                ))?;
            }
            EventKind::EnvironmentChanged => {
                sink.log(
                    "info",
                    format!(
                        "Env changed: {}={}",
                        text_field(&data, "key"),
                        truncate_chars(text_field(&data, "value"), ENV_VALUE_CHARS)
                    ),
                )?;
            }
            EventKind::UserVarChanged => {
                sink.log(
                    "info",
                    format!(
                        "User var: {}={}",
                        text_field(&data, "name"),
                        text_field(&data, "value")
                    ),
                )?;
            }
            _ => {
                sink.log(
                    "debug",
                    format!("Unhandled event: {}", event.kind_or_unknown()),
                )?;
            }
        }

        if !self.failures.is_empty() {
            sink.send(&ScriptCommand::set_panel(
                "Failed Commands",
                self.failure_panel(),
            ))?;
        }
        Ok(())
    }

    fn finish<W: Write>(&mut self, sink: &mut CommandSink<W>) -> Result<(), ProtocolError> {
        sink.log("info", "Command mode ended")?;
        if self.total_failures > 0 {
            sink.send(&ScriptCommand::clear_panel())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cwd_badge() {
        assert_eq!(cwd_badge("/home/user/project"), "project");
        assert_eq!(cwd_badge("/"), "/");
        assert_eq!(cwd_badge(""), "/");
        assert_eq!(cwd_badge("/home/user/"), "/");
        assert_eq!(cwd_badge("relative"), "relative");
    }

    #[test]
    fn test_failure_history_is_capped() {
        let mut mode = ReactorMode::new();
        for i in 0..15 {
            mode.record_failure(format!("cmd{i} (exit 1)"));
        }
        let recent: Vec<&str> = mode.recent_failures().collect();
        assert_eq!(recent.len(), FAILURE_HISTORY);
        assert_eq!(recent[0], "cmd5 (exit 1)");
        assert_eq!(recent[9], "cmd14 (exit 1)");
        assert_eq!(mode.total_failures(), 15);
    }
}
