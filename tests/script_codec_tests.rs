//! Line codec and stream adapter tests.

use par_term_scripting::codec::{decode_command, decode_event, encode_command, encode_event};
use par_term_scripting::{
    CommandSink, EventSource, ProtocolError, ScriptCommand, ScriptEvent, ScriptEventData,
};
use std::io::Cursor;

fn all_commands() -> Vec<ScriptCommand> {
    vec![
        ScriptCommand::log("warn", "disk almost full"),
        ScriptCommand::notify("Build", "done in 3s"),
        ScriptCommand::set_panel("Status", "## Title\n- item \"quoted\""),
        ScriptCommand::clear_panel(),
        ScriptCommand::write_text("echo hi\n"),
        ScriptCommand::set_badge("OK"),
        ScriptCommand::set_variable("last_cwd", "/tmp"),
        ScriptCommand::run_command("date > /tmp/x"),
        ScriptCommand::change_config("font_size", 14.0),
        ScriptCommand::change_config("theme", serde_json::json!({"name": "dark", "bold": true})),
    ]
}

#[test]
fn test_every_command_survives_encode_decode() {
    for command in all_commands() {
        let line = encode_command(&command).unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1, "multi-line encoding: {line}");
        assert_eq!(decode_command(&line).unwrap(), Some(command));
    }
}

#[test]
fn test_decode_never_panics_on_garbage() {
    let inputs = [
        "",
        "   ",
        "{",
        "}",
        "null",
        "42",
        "\"kind\"",
        "[1,2,3]",
        "{\"kind\": 5}",
        "{\"kind\":\"x\",\"data\":[]}",
        "{\"kind\":\"x\",\"data\":\"str\"}",
        "\u{0}\u{1}\u{fffd}",
        "{\"kind\":\"x\",\"data\":{\"data_type\":7}}",
    ];
    for input in inputs {
        match decode_event(input) {
            Ok(_) => {}
            Err(ProtocolError::Decode { line, .. }) => assert_eq!(line, input.trim()),
            Err(other) => panic!("unexpected error kind for {input:?}: {other}"),
        }
    }
}

#[test]
fn test_blank_lines_are_not_events() {
    assert!(decode_event("").unwrap().is_none());
    assert!(decode_event(" \t ").unwrap().is_none());
}

#[test]
fn test_event_source_keeps_going_after_bad_lines() {
    let good = encode_event(&ScriptEvent::new("bell_rang", ScriptEventData::Empty)).unwrap();
    let input = format!("oops\n\n{good}{{\"kind\":\n{good}");
    let items: Vec<_> = EventSource::new(Cursor::new(input)).collect();

    assert_eq!(items.len(), 4);
    assert!(matches!(items[0], Err(ProtocolError::Decode { .. })));
    assert!(items[1].is_ok());
    assert!(matches!(items[2], Err(ProtocolError::Decode { .. })));
    assert_eq!(items[3].as_ref().unwrap().kind, "bell_rang");
}

#[test]
fn test_sink_preserves_call_order() {
    let mut sink = CommandSink::new(Vec::new());
    for command in all_commands() {
        sink.send(&command).unwrap();
    }
    assert_eq!(sink.sent(), all_commands().len() as u64);

    let written = String::from_utf8(sink.into_inner()).unwrap();
    let decoded: Vec<ScriptCommand> = written
        .lines()
        .map(|l| decode_command(l).unwrap().unwrap())
        .collect();
    assert_eq!(decoded, all_commands());
}
