//! par-term-script-observer: reference script for par-term's JSON scripting protocol.

use anyhow::Result;
use clap::Parser;
use par_term_script_tools::cli::ObserverCli;
use par_term_script_tools::observer::{ObserverConfig, run_observer};
use par_term_script_tools::shutdown::{Outcome, Shutdown, run_until_interrupted};
use std::io::{self, BufReader};

fn main() -> Result<()> {
    let cli = ObserverCli::parse();
    // Diagnostics go to stderr; stdout carries nothing but protocol commands.
    par_term_script_tools::debug::init_log_bridge(cli.log_level.map(|l| l.to_level_filter()));

    let config = match ObserverConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    log::info!(
        "par-term-script-observer {} starting in '{}' mode",
        par_term_script_tools::VERSION,
        config.mode.name()
    );

    let outcome = run_until_interrupted(Shutdown::new(), move |shutdown| {
        run_observer(
            &config,
            BufReader::new(io::stdin()),
            io::stdout(),
            &shutdown,
        )
    })?;

    match outcome {
        Outcome::Finished(Err(e)) => {
            log::error!("observer failed: {}", e);
            Err(e.into())
        }
        Outcome::Finished(Ok(())) => Ok(()),
        Outcome::Interrupted => {
            log::info!("interrupted");
            Ok(())
        }
    }
}
