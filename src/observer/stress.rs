//! Stress mode: counts events as fast as they arrive and reports throughput.

use std::io::Write;
use std::time::{Duration, Instant};

use par_term_scripting::{CommandSink, ProtocolError, ScriptCommand, ScriptEvent};

use super::EventMode;

/// Events per second, zero when no time has elapsed.
pub fn rate(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { count as f64 / secs } else { 0.0 }
}

pub struct StressMode {
    count: u64,
    interval: Duration,
    started: Instant,
    last_report: Instant,
}

impl StressMode {
    pub fn new(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            count: 0,
            interval,
            started: now,
            last_report: now,
        }
    }
}

impl EventMode for StressMode {
    fn start<W: Write>(&mut self, sink: &mut CommandSink<W>) -> Result<(), ProtocolError> {
        sink.log("info", "Stress mode started - measuring throughput")?;
        let now = Instant::now();
        self.started = now;
        self.last_report = now;
        Ok(())
    }

    fn on_event<W: Write>(
        &mut self,
        _event: &ScriptEvent,
        sink: &mut CommandSink<W>,
    ) -> Result<(), ProtocolError> {
        self.count += 1;
        let now = Instant::now();
        if now.duration_since(self.last_report) < self.interval {
            return Ok(());
        }

        let elapsed = now.duration_since(self.started);
        let secs = elapsed.as_secs_f64();
        let rate = rate(self.count, elapsed);
        sink.log(
            "info",
            format!(
                "Processed {} events in {:.1}s ({:.0} events/s)",
                self.count, secs, rate
            ),
        )?;
        sink.send(&ScriptCommand::set_panel(
            "Stress Test",
            format!(
                "## Throughput\n- Events: {}\n- Rate: {:.0}/s\n- Elapsed: {:.1}s",
                self.count, rate, secs
            ),
        ))?;
        self.last_report = now;
        Ok(())
    }

    fn finish<W: Write>(&mut self, sink: &mut CommandSink<W>) -> Result<(), ProtocolError> {
        let elapsed = self.started.elapsed();
        sink.log(
            "info",
            format!(
                "Stress test complete: {} events in {:.1}s ({:.0}/s)",
                self.count,
                elapsed.as_secs_f64(),
                rate(self.count, elapsed)
            ),
        )
    }
}
