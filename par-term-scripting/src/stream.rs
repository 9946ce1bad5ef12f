//! Event source and command sink over line-oriented streams.
//!
//! [`EventSource`] lazily reads [`ScriptEvent`]s from a [`BufRead`] until end of stream.
//! [`CommandSink`] writes [`ScriptCommand`]s to a [`Write`], flushing after every command so
//! the host sees them in call order as soon as they are emitted.

use std::io::{BufRead, Write};

use crate::codec::{decode_event, encode_command};
use crate::error::ProtocolError;
use crate::protocol::{ScriptCommand, ScriptEvent};

/// Forward-only sequence of events read from an input stream.
///
/// Yields `Err(ProtocolError::Decode { .. })` for a malformed line and keeps going with the
/// next one. Blank lines are skipped. End of stream, or a read error (yielded once), ends
/// the sequence.
pub struct EventSource<R> {
    reader: R,
    buf: Vec<u8>,
    finished: bool,
    line_no: u64,
}

impl<R: BufRead> EventSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            finished: false,
            line_no: 0,
        }
    }

    /// Number of lines read so far (including blank and malformed ones).
    pub fn lines_read(&self) -> u64 {
        self.line_no
    }
}

impl<R: BufRead> Iterator for EventSource<R> {
    type Item = Result<ScriptEvent, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    self.line_no += 1;
                    let line = match std::str::from_utf8(&self.buf) {
                        Ok(line) => line,
                        Err(e) => {
                            log::debug!("EventSource: line {} is not UTF-8: {}", self.line_no, e);
                            return Some(Err(ProtocolError::Decode {
                                message: format!("invalid UTF-8: {e}"),
                                line: String::from_utf8_lossy(&self.buf).trim().to_string(),
                            }));
                        }
                    };
                    match decode_event(line) {
                        Ok(Some(event)) => return Some(Ok(event)),
                        Ok(None) => continue,
                        Err(e) => {
                            log::debug!("EventSource: line {} not decoded: {}", self.line_no, e);
                            return Some(Err(e));
                        }
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(ProtocolError::from(e)));
                }
            }
        }
        None
    }
}

/// Writes commands as JSON lines, one flush per command.
pub struct CommandSink<W> {
    writer: W,
    sent: u64,
}

impl<W: Write> CommandSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, sent: 0 }
    }

    /// Serialize and flush a single command.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Closed`] when the host closed its end of the pipe.
    pub fn send(&mut self, command: &ScriptCommand) -> Result<(), ProtocolError> {
        let line = encode_command(command)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        self.sent += 1;
        log::trace!("-> {}", line.trim_end());
        Ok(())
    }

    /// Send a `Log` command.
    pub fn log(&mut self, level: &str, message: impl Into<String>) -> Result<(), ProtocolError> {
        self.send(&ScriptCommand::log(level, message))
    }

    /// Number of commands written so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_source_skips_blank_and_reports_bad_lines() {
        let input = "\n{\"kind\":\"bell_rang\",\"data\":{\"data_type\":\"Empty\"}}\n{oops\n\n{\"kind\":\"title_changed\",\"data\":{\"data_type\":\"TitleChanged\",\"title\":\"t\"}}\n";
        let items: Vec<_> = EventSource::new(Cursor::new(input)).collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap().kind, "bell_rang");
        assert!(items[1].as_ref().unwrap_err().is_recoverable());
        assert_eq!(items[2].as_ref().unwrap().kind, "title_changed");
    }

    #[test]
    fn test_source_reports_invalid_utf8_and_continues() {
        let bell = b"{\"kind\":\"bell_rang\",\"data\":{\"data_type\":\"Empty\"}}\n";
        let mut input = bell.to_vec();
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(bell);
        let items: Vec<_> = EventSource::new(Cursor::new(input)).collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap().kind, "bell_rang");
        let err = items[1].as_ref().unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().starts_with("invalid UTF-8"));
        assert_eq!(items[2].as_ref().unwrap().kind, "bell_rang");
    }

    #[test]
    fn test_source_handles_missing_trailing_newline() {
        let input = "{\"kind\":\"bell_rang\"}";
        let mut source = EventSource::new(Cursor::new(input));
        assert_eq!(source.next().unwrap().unwrap().kind, "bell_rang");
        assert!(source.next().is_none());
        assert!(source.next().is_none());
        assert_eq!(source.lines_read(), 1);
    }

    #[test]
    fn test_sink_writes_in_call_order() {
        let mut sink = CommandSink::new(Vec::new());
        sink.send(&ScriptCommand::set_badge("A")).unwrap();
        sink.log("info", "hello").unwrap();
        assert_eq!(sink.sent(), 2);
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], r#"{"type":"SetBadge","text":"A"}"#);
        assert_eq!(lines[1], r#"{"type":"Log","level":"info","message":"hello"}"#);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_maps_broken_pipe_to_closed() {
        let mut sink = CommandSink::new(ClosedPipe);
        let err = sink.send(&ScriptCommand::clear_panel()).unwrap_err();
        assert!(err.is_shutdown());
    }
}
