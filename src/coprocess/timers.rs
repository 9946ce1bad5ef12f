//! Timer-driven coprocess modes: periodic heartbeats and the line counter.
//!
//! Both modes are built from message passing rather than shared state. A [`spawn_ticker`]
//! thread sends [`Message::Tick`], a stdin reader thread sends [`Message::Line`] and
//! [`Message::EndOfInput`], and a single loop on the calling thread owns every piece of
//! mutable state and all output. Counter reports are therefore monotonically
//! non-decreasing and never exceed the number of lines received.
//!
//! Helper threads are never joined. A reader blocked on stdin or a sleeping ticker must not
//! hold up process exit; a ticker notices the owner is gone on its next send.

use chrono::Utc;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use super::text::read_lines_lossy;
use crate::shutdown::Shutdown;

/// Input to an owning timer loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// One line arrived on stdin.
    Line,
    /// Stdin reached end of stream (or failed).
    EndOfInput,
    /// The reporting interval elapsed.
    Tick,
    /// Shutdown was requested.
    Stop,
}

/// Spawn a thread that sends [`Message::Tick`] every `interval` until the receiver is gone.
///
/// With `immediate` the first tick is sent right away.
pub fn spawn_ticker(interval: Duration, tx: Sender<Message>, immediate: bool) -> io::Result<()> {
    thread::Builder::new()
        .name("ticker".to_string())
        .spawn(move || {
            if immediate && tx.send(Message::Tick).is_err() {
                return;
            }
            loop {
                thread::sleep(interval);
                if tx.send(Message::Tick).is_err() {
                    break;
                }
            }
        })?;
    Ok(())
}

/// Spawn a thread that reads `input` to the end. With `forward` each line is reported as
/// [`Message::Line`]; otherwise the input is just discarded. Always ends with
/// [`Message::EndOfInput`].
pub fn spawn_reader<R>(input: R, tx: Sender<Message>, forward: bool) -> io::Result<()>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in read_lines_lossy(input) {
                if let Err(e) = line {
                    log::warn!("error reading stdin: {}", e);
                    break;
                }
                if forward && tx.send(Message::Line).is_err() {
                    return;
                }
            }
            let _ = tx.send(Message::EndOfInput);
        })?;
    Ok(())
}

/// Heartbeat loop: one line per tick until [`Message::Stop`] or every sender is gone.
///
/// End of input does not stop the heartbeat. Returns the number of beats written.
pub fn run_periodic<W: Write>(rx: Receiver<Message>, out: &mut W) -> io::Result<u64> {
    let mut beats = 0;
    for message in rx {
        match message {
            Message::Tick => {
                beats += 1;
                writeln!(
                    out,
                    "[heartbeat #{}] {}",
                    beats,
                    Utc::now().format("%H:%M:%S")
                )?;
                out.flush()?;
            }
            Message::EndOfInput => log::debug!("stdin closed, heartbeat continues"),
            Message::Line => {}
            Message::Stop => break,
        }
    }
    Ok(beats)
}

/// Counter loop: counts lines, reports the running total on every tick and the final
/// total at end of input or on stop. Returns the final count.
pub fn run_counter<W: Write>(rx: Receiver<Message>, out: &mut W) -> io::Result<u64> {
    let mut count: u64 = 0;
    for message in rx {
        match message {
            Message::Line => count += 1,
            Message::Tick => {
                writeln!(out, "[counter] {count} lines received")?;
                out.flush()?;
            }
            Message::EndOfInput | Message::Stop => break,
        }
    }
    writeln!(out, "[counter] final: {count} lines")?;
    out.flush()?;
    Ok(count)
}

/// Wire up periodic mode: drain stdin in the background and beat every `interval`.
pub fn periodic_mode<R, W>(
    input: R,
    out: &mut W,
    interval: Duration,
    shutdown: &Shutdown,
) -> io::Result<u64>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    let (tx, rx) = mpsc::channel();
    spawn_reader(input, tx.clone(), false)?;
    spawn_ticker(interval, tx.clone(), true)?;
    shutdown.on_shutdown(move || {
        let _ = tx.send(Message::Stop);
    });
    run_periodic(rx, out)
}

/// Wire up counter mode.
///
/// The final report on interrupt is best-effort: if the process exits before the owning
/// loop handles [`Message::Stop`], it is lost.
pub fn counter_mode<R, W>(
    input: R,
    out: &mut W,
    interval: Duration,
    shutdown: &Shutdown,
) -> io::Result<u64>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    let (tx, rx) = mpsc::channel();
    spawn_reader(input, tx.clone(), true)?;
    spawn_ticker(interval, tx.clone(), false)?;
    shutdown.on_shutdown(move || {
        let _ = tx.send(Message::Stop);
    });
    run_counter(rx, out)
}
