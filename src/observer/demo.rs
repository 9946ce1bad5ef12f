//! Demo mode: sends all 9 command types when the first event arrives.

use std::io::Write;

use par_term_scripting::{CommandSink, ProtocolError, ScriptCommand, ScriptEvent};

use super::EventMode;

/// File the `RunCommand` demo writes to.
pub const DEMO_OUTPUT_FILE: &str = "/tmp/par_term_script_demo.txt";

#[derive(Debug, Default)]
pub struct DemoMode {
    triggered: bool,
    drained: u64,
}

impl DemoMode {
    pub fn new() -> Self {
        Self::default()
    }

    fn demonstrate<W: Write>(
        &mut self,
        kind: &str,
        sink: &mut CommandSink<W>,
    ) -> Result<(), ProtocolError> {
        let ts = chrono::Utc::now().format("%H:%M:%S").to_string();
        sink.log("info", format!("Received trigger event: {kind} at {ts}"))?;

        sink.log("info", "Demo: testing Log command (you're seeing this)")?;

        sink.send(&ScriptCommand::notify(
            "Script Demo",
            format!("Triggered by {kind} event at {ts}"),
        ))?;
        sink.log("info", "Demo: sent Notify command")?;

        sink.send(&ScriptCommand::set_badge("DEMO"))?;
        sink.log("info", "Demo: sent SetBadge command")?;

        sink.send(&ScriptCommand::set_variable("demo_timestamp", ts.as_str()))?;
        sink.send(&ScriptCommand::set_variable("demo_trigger_event", kind))?;
        sink.log("info", "Demo: sent SetVariable commands")?;

        sink.send(&ScriptCommand::set_panel(
            "Demo Results",
            format!(
                "## Script Demo Complete\n\
                 - **Trigger**: `{kind}` at {ts}\n\
                 - **Commands sent**: 9 (all types)\n\
                 - **Log**: working\n\
                 - **Notify**: sent\n\
                 - **SetBadge**: DEMO\n\
                 - **SetVariable**: demo_timestamp, demo_trigger_event\n\
                 - **WriteText**: echo command\n\
                 - **RunCommand**: date\n\
                 - **ChangeConfig**: (logged only)\n\
                 - **ClearPanel**: will fire on exit\n"
            ),
        ))?;
        sink.log("info", "Demo: sent SetPanel command")?;

        sink.send(&ScriptCommand::write_text(
            "echo 'par-term script demo: WriteText command works!'\n",
        ))?;
        sink.log("info", "Demo: sent WriteText command")?;

        sink.send(&ScriptCommand::run_command(format!(
            "echo 'par-term script demo: RunCommand works' > {DEMO_OUTPUT_FILE}"
        )))?;
        sink.log("info", "Demo: sent RunCommand command")?;

        sink.send(&ScriptCommand::change_config("font_size", 14.0))?;
        sink.log("info", "Demo: sent ChangeConfig command (may be no-op)")?;

        sink.log(
            "info",
            "Demo complete! All 9 command types sent. Draining remaining events...",
        )
    }
}

impl EventMode for DemoMode {
    fn start<W: Write>(&mut self, sink: &mut CommandSink<W>) -> Result<(), ProtocolError> {
        sink.log(
            "info",
            "Demo mode started - waiting for first event to demo all commands",
        )?;
        sink.send(&ScriptCommand::set_panel(
            "Demo",
            "## Script Demo\nWaiting for first terminal event...",
        ))
    }

    fn on_event<W: Write>(
        &mut self,
        event: &ScriptEvent,
        sink: &mut CommandSink<W>,
    ) -> Result<(), ProtocolError> {
        if !self.triggered {
            self.triggered = true;
            return self.demonstrate(event.kind_or_unknown(), sink);
        }
        self.drained += 1;
        sink.log(
            "debug",
            format!("Post-demo event: {}", event.kind_or_unknown()),
        )
    }

    fn finish<W: Write>(&mut self, sink: &mut CommandSink<W>) -> Result<(), ProtocolError> {
        if !self.triggered {
            return sink.log("warn", "No event received - stdin closed immediately");
        }
        log::debug!("demo drained {} events after the trigger", self.drained);
        sink.send(&ScriptCommand::clear_panel())?;
        sink.log("info", "Demo: sent ClearPanel on exit")
    }
}
