//! JSON protocol types for communication between the terminal and script subprocesses.
//!
//! Scripts read [`ScriptEvent`] objects from stdin (one JSON object per line) and write
//! [`ScriptCommand`] objects to stdout (one JSON object per line).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// An event sent from the terminal to a script subprocess (via stdin).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptEvent {
    /// Event kind name (e.g., "bell_rang", "cwd_changed", "command_complete").
    ///
    /// Empty when the host omitted the field; that is a validation defect, not a decode error.
    #[serde(default)]
    pub kind: String,
    /// Event-specific payload.
    #[serde(default, skip_serializing_if = "ScriptEventData::is_missing")]
    pub data: ScriptEventData,
}

impl ScriptEvent {
    /// Build an event from a kind name and payload.
    pub fn new(kind: impl Into<String>, data: ScriptEventData) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }

    /// The parsed event kind.
    pub fn event_kind(&self) -> EventKind {
        EventKind::from_name(&self.kind)
    }

    /// Kind name for display, `"unknown"` when the host sent none.
    pub fn kind_or_unknown(&self) -> &str {
        if self.kind.is_empty() {
            "unknown"
        } else {
            &self.kind
        }
    }
}

/// Event-specific payload data.
///
/// On the wire this is an object tagged with `data_type` so scripts can easily dispatch on it.
/// Payloads that do not match a known variant are kept verbatim in [`ScriptEventData::Unknown`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub enum ScriptEventData {
    /// The event carried no `data` object at all.
    #[default]
    Missing,

    /// Empty payload for events that carry no additional data (e.g., BellRang).
    Empty,

    /// The current working directory changed.
    CwdChanged {
        /// New working directory path.
        cwd: String,
    },

    /// A command completed execution.
    CommandComplete {
        /// The command that completed.
        command: String,
        /// Exit code, if available.
        exit_code: Option<i32>,
    },

    /// The terminal title changed.
    TitleChanged {
        /// New terminal title.
        title: String,
    },

    /// The terminal size changed.
    SizeChanged {
        /// Number of columns.
        cols: usize,
        /// Number of rows.
        rows: usize,
    },

    /// A user variable changed.
    VariableChanged {
        /// Variable name.
        name: String,
        /// New value.
        value: String,
        /// Previous value, if any.
        old_value: Option<String>,
    },

    /// An environment variable changed.
    EnvironmentChanged {
        /// Environment variable key.
        key: String,
        /// New value.
        value: String,
        /// Previous value, if any.
        old_value: Option<String>,
    },

    /// The badge text changed.
    BadgeChanged {
        /// New badge text, or None if cleared.
        text: Option<String>,
    },

    /// A trigger pattern was matched.
    TriggerMatched {
        /// The trigger pattern that matched.
        pattern: String,
        /// The text that matched.
        matched_text: String,
        /// Line number where the match occurred.
        line: usize,
    },

    /// A semantic zone event occurred.
    ZoneEvent {
        /// Zone identifier.
        zone_id: u64,
        /// Type of zone.
        zone_type: String,
        /// Event type (e.g., "opened", "closed").
        event: String,
    },

    /// Payload with an unrecognised or absent `data_type`, or a known `data_type`
    /// whose fields did not match. The raw fields are preserved.
    Unknown {
        /// The discriminator as sent, if any.
        data_type: Option<String>,
        /// Every other field of the payload.
        fields: Map<String, Value>,
    },
}

impl ScriptEventData {
    /// Whether the event had no `data` object.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// The `data_type` discriminator this payload carries on the wire.
    pub fn data_type(&self) -> Option<&str> {
        Some(match self {
            Self::Missing => return None,
            Self::Empty => "Empty",
            Self::CwdChanged { .. } => "CwdChanged",
            Self::CommandComplete { .. } => "CommandComplete",
            Self::TitleChanged { .. } => "TitleChanged",
            Self::SizeChanged { .. } => "SizeChanged",
            Self::VariableChanged { .. } => "VariableChanged",
            Self::EnvironmentChanged { .. } => "EnvironmentChanged",
            Self::BadgeChanged { .. } => "BadgeChanged",
            Self::TriggerMatched { .. } => "TriggerMatched",
            Self::ZoneEvent { .. } => "ZoneEvent",
            Self::Unknown { data_type, .. } => return data_type.as_deref(),
        })
    }

    /// The payload as a wire object, without the `data_type` discriminator.
    pub fn fields(&self) -> Map<String, Value> {
        let mut map = Map::from(self.clone());
        map.remove("data_type");
        map
    }

    /// Try to build a typed variant from a known discriminator and its fields.
    fn typed(data_type: &str, f: &Map<String, Value>) -> Option<Self> {
        Some(match data_type {
            "Empty" => Self::Empty,
            "CwdChanged" => Self::CwdChanged {
                cwd: string(f, "cwd")?,
            },
            "CommandComplete" => Self::CommandComplete {
                command: string(f, "command")?,
                exit_code: optional(f, "exit_code", |v| {
                    v.as_i64().and_then(|n| i32::try_from(n).ok())
                })?,
            },
            "TitleChanged" => Self::TitleChanged {
                title: string(f, "title")?,
            },
            "SizeChanged" => Self::SizeChanged {
                cols: unsigned(f, "cols")?,
                rows: unsigned(f, "rows")?,
            },
            "VariableChanged" => Self::VariableChanged {
                name: string(f, "name")?,
                value: string(f, "value")?,
                old_value: optional(f, "old_value", |v| v.as_str().map(str::to_owned))?,
            },
            "EnvironmentChanged" => Self::EnvironmentChanged {
                key: string(f, "key")?,
                value: string(f, "value")?,
                old_value: optional(f, "old_value", |v| v.as_str().map(str::to_owned))?,
            },
            "BadgeChanged" => Self::BadgeChanged {
                text: optional(f, "text", |v| v.as_str().map(str::to_owned))?,
            },
            "TriggerMatched" => Self::TriggerMatched {
                pattern: string(f, "pattern")?,
                matched_text: string(f, "matched_text")?,
                line: unsigned(f, "line")?,
            },
            "ZoneEvent" => Self::ZoneEvent {
                zone_id: f.get("zone_id")?.as_u64()?,
                zone_type: string(f, "zone_type")?,
                event: string(f, "event")?,
            },
            _ => return None,
        })
    }
}

fn string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key)?.as_str().map(str::to_owned)
}

fn unsigned(fields: &Map<String, Value>, key: &str) -> Option<usize> {
    fields
        .get(key)?
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
}

/// Absent or null yields `Some(None)`; a present value of the wrong type yields `None`.
fn optional<T>(
    fields: &Map<String, Value>,
    key: &str,
    convert: impl FnOnce(&Value) -> Option<T>,
) -> Option<Option<T>> {
    match fields.get(key) {
        None | Some(Value::Null) => Some(None),
        Some(v) => convert(v).map(Some),
    }
}

impl From<Map<String, Value>> for ScriptEventData {
    fn from(mut fields: Map<String, Value>) -> Self {
        let data_type = match fields.get("data_type") {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        if let Some(typed) = data_type.as_deref().and_then(|t| Self::typed(t, &fields)) {
            return typed;
        }
        if data_type.is_some() {
            fields.remove("data_type");
        }
        Self::Unknown { data_type, fields }
    }
}

impl From<ScriptEventData> for Map<String, Value> {
    fn from(data: ScriptEventData) -> Self {
        let value = match data {
            ScriptEventData::Missing => return Map::new(),
            ScriptEventData::Empty => json!({ "data_type": "Empty" }),
            ScriptEventData::CwdChanged { cwd } => json!({ "data_type": "CwdChanged", "cwd": cwd }),
            ScriptEventData::CommandComplete { command, exit_code } => json!({
                "data_type": "CommandComplete",
                "command": command,
                "exit_code": exit_code,
            }),
            ScriptEventData::TitleChanged { title } => {
                json!({ "data_type": "TitleChanged", "title": title })
            }
            ScriptEventData::SizeChanged { cols, rows } => {
                json!({ "data_type": "SizeChanged", "cols": cols, "rows": rows })
            }
            ScriptEventData::VariableChanged {
                name,
                value,
                old_value,
            } => json!({
                "data_type": "VariableChanged",
                "name": name,
                "value": value,
                "old_value": old_value,
            }),
            ScriptEventData::EnvironmentChanged {
                key,
                value,
                old_value,
            } => json!({
                "data_type": "EnvironmentChanged",
                "key": key,
                "value": value,
                "old_value": old_value,
            }),
            ScriptEventData::BadgeChanged { text } => {
                json!({ "data_type": "BadgeChanged", "text": text })
            }
            ScriptEventData::TriggerMatched {
                pattern,
                matched_text,
                line,
            } => json!({
                "data_type": "TriggerMatched",
                "pattern": pattern,
                "matched_text": matched_text,
                "line": line,
            }),
            ScriptEventData::ZoneEvent {
                zone_id,
                zone_type,
                event,
            } => json!({
                "data_type": "ZoneEvent",
                "zone_id": zone_id,
                "zone_type": zone_type,
                "event": event,
            }),
            ScriptEventData::Unknown {
                data_type,
                mut fields,
            } => {
                if let Some(data_type) = data_type {
                    fields.insert("data_type".to_string(), Value::String(data_type));
                }
                return fields;
            }
        };
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Public event names emitted by the terminal.
///
/// `kind` is a free-form string on the wire; this enum lets consumers match on it exhaustively,
/// with [`EventKind::Other`] absorbing names this crate does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    BellRang,
    TitleChanged,
    SizeChanged,
    ModeChanged,
    GraphicsAdded,
    HyperlinkAdded,
    DirtyRegion,
    CwdChanged,
    TriggerMatched,
    UserVarChanged,
    VariableChanged,
    ProgressBarChanged,
    BadgeChanged,
    CommandComplete,
    ZoneOpened,
    ZoneClosed,
    ZoneScrolledOut,
    EnvironmentChanged,
    RemoteHostTransition,
    SubShellDetected,
    FileTransferStarted,
    FileTransferProgress,
    FileTransferCompleted,
    FileTransferFailed,
    UploadRequested,
    /// Any other (or empty) kind name.
    Other(String),
}

impl EventKind {
    /// Parse a snake_case kind name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "bell_rang" => Self::BellRang,
            "title_changed" => Self::TitleChanged,
            "size_changed" => Self::SizeChanged,
            "mode_changed" => Self::ModeChanged,
            "graphics_added" => Self::GraphicsAdded,
            "hyperlink_added" => Self::HyperlinkAdded,
            "dirty_region" => Self::DirtyRegion,
            "cwd_changed" => Self::CwdChanged,
            "trigger_matched" => Self::TriggerMatched,
            "user_var_changed" => Self::UserVarChanged,
            "variable_changed" => Self::VariableChanged,
            "progress_bar_changed" => Self::ProgressBarChanged,
            "badge_changed" => Self::BadgeChanged,
            "command_complete" => Self::CommandComplete,
            "zone_opened" => Self::ZoneOpened,
            "zone_closed" => Self::ZoneClosed,
            "zone_scrolled_out" => Self::ZoneScrolledOut,
            "environment_changed" => Self::EnvironmentChanged,
            "remote_host_transition" => Self::RemoteHostTransition,
            "sub_shell_detected" => Self::SubShellDetected,
            "file_transfer_started" => Self::FileTransferStarted,
            "file_transfer_progress" => Self::FileTransferProgress,
            "file_transfer_completed" => Self::FileTransferCompleted,
            "file_transfer_failed" => Self::FileTransferFailed,
            "upload_requested" => Self::UploadRequested,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A command sent from a script subprocess to the terminal (via stdout).
///
/// Tagged with `type` for easy JSON dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ScriptCommand {
    /// Write text to the PTY.
    WriteText {
        /// Text to write.
        text: String,
    },

    /// Show a desktop notification.
    Notify {
        /// Notification title.
        title: String,
        /// Notification body.
        body: String,
    },

    /// Set the tab badge text.
    SetBadge {
        /// Badge text to display.
        text: String,
    },

    /// Set a user variable.
    SetVariable {
        /// Variable name.
        name: String,
        /// Variable value.
        value: String,
    },

    /// Execute a shell command.
    RunCommand {
        /// Command to execute.
        command: String,
    },

    /// Change a configuration value.
    ChangeConfig {
        /// Configuration key.
        key: String,
        /// New value.
        value: Value,
    },

    /// Log a message.
    Log {
        /// Log level (e.g., "info", "warn", "error", "debug").
        level: String,
        /// Log message.
        message: String,
    },

    /// Set a markdown panel.
    SetPanel {
        /// Panel title.
        title: String,
        /// Markdown content.
        content: String,
    },

    /// Clear the markdown panel.
    ClearPanel {},
}

impl ScriptCommand {
    pub fn log(level: &str, message: impl Into<String>) -> Self {
        Self::Log {
            level: level.to_string(),
            message: message.into(),
        }
    }

    pub fn notify(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Notify {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn set_panel(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::SetPanel {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn clear_panel() -> Self {
        Self::ClearPanel {}
    }

    pub fn write_text(text: impl Into<String>) -> Self {
        Self::WriteText { text: text.into() }
    }

    pub fn set_badge(text: impl Into<String>) -> Self {
        Self::SetBadge { text: text.into() }
    }

    pub fn set_variable(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SetVariable {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn run_command(command: impl Into<String>) -> Self {
        Self::RunCommand {
            command: command.into(),
        }
    }

    pub fn change_config(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::ChangeConfig {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Wire tag of this command (the `type` field).
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::WriteText { .. } => "WriteText",
            Self::Notify { .. } => "Notify",
            Self::SetBadge { .. } => "SetBadge",
            Self::SetVariable { .. } => "SetVariable",
            Self::RunCommand { .. } => "RunCommand",
            Self::ChangeConfig { .. } => "ChangeConfig",
            Self::Log { .. } => "Log",
            Self::SetPanel { .. } => "SetPanel",
            Self::ClearPanel {} => "ClearPanel",
        }
    }
}
