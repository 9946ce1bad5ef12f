//! Validate mode: a structural linter for incoming events.

use std::io::Write;

use par_term_scripting::{CommandSink, ProtocolError, ScriptEvent, ScriptEventData};
use serde_json::Value;

use super::EventMode;

/// Required payload fields per known `data_type`.
const REQUIRED_FIELDS: &[(&str, &[&str], &str)] = &[
    ("CwdChanged", &["cwd"], "CwdChanged missing 'cwd' field"),
    (
        "CommandComplete",
        &["command"],
        "CommandComplete missing 'command' field",
    ),
    ("TitleChanged", &["title"], "TitleChanged missing 'title' field"),
    (
        "SizeChanged",
        &["cols", "rows"],
        "SizeChanged missing 'cols' or 'rows'",
    ),
    (
        "VariableChanged",
        &["name", "value"],
        "VariableChanged missing 'name' or 'value'",
    ),
    (
        "EnvironmentChanged",
        &["key", "value"],
        "EnvironmentChanged missing 'key' or 'value'",
    ),
];

/// Structural issues of one event. Pure: the same event always yields the same list.
pub fn validate_event(event: &ScriptEvent) -> Vec<String> {
    let mut issues = Vec::new();
    if event.kind.is_empty() {
        issues.push("missing 'kind'".to_string());
    }
    if event.data.is_missing() {
        issues.push("missing 'data'".to_string());
    }
    if event.data.data_type().is_none() {
        issues.push("missing 'data_type' in data".to_string());
    }

    // Typed variants are complete by construction; only raw payloads need checking.
    if let ScriptEventData::Unknown {
        data_type: Some(data_type),
        fields,
    } = &event.data
        && let Some((_, required, message)) =
            REQUIRED_FIELDS.iter().find(|(t, _, _)| *t == data_type.as_str())
        && required.iter().any(|f| !fields.contains_key(*f))
    {
        issues.push((*message).to_string());
    }
    issues
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// One-line description of an event's shape.
pub fn describe_event(event: &ScriptEvent) -> String {
    let fields = event
        .data
        .fields()
        .iter()
        .map(|(k, v)| format!("{k}: {}", json_type_name(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Event kind='{}' data_type='{}' fields={{{}}}",
        if event.kind.is_empty() { "?" } else { event.kind.as_str() },
        event.data.data_type().unwrap_or("?"),
        fields
    )
}

#[derive(Debug, Default)]
pub struct ValidateMode {
    checked: u64,
    with_issues: u64,
}

impl ValidateMode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventMode for ValidateMode {
    fn start<W: Write>(&mut self, sink: &mut CommandSink<W>) -> Result<(), ProtocolError> {
        sink.log("info", "Validate mode started - echoing event structure")
    }

    fn on_event<W: Write>(
        &mut self,
        event: &ScriptEvent,
        sink: &mut CommandSink<W>,
    ) -> Result<(), ProtocolError> {
        self.checked += 1;
        sink.log("info", describe_event(event))?;

        let issues = validate_event(event);
        if issues.is_empty() {
            sink.log(
                "debug",
                format!("Event {} validated OK", event.kind_or_unknown()),
            )
        } else {
            self.with_issues += 1;
            sink.log("warn", format!("Validation issues: {}", issues.join(", ")))
        }
    }

    fn finish<W: Write>(&mut self, sink: &mut CommandSink<W>) -> Result<(), ProtocolError> {
        log::debug!(
            "validated {} events, {} with issues",
            self.checked,
            self.with_issues
        );
        sink.log("info", "Validate mode ended")
    }
}
