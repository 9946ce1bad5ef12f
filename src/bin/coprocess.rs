//! par-term-coprocess: text-mode coprocess for par-term automation.

use anyhow::Result;
use clap::Parser;
use par_term_script_tools::cli::CoprocessCli;
use par_term_script_tools::coprocess::{CoprocessConfig, run_coprocess};
use par_term_script_tools::shutdown::{Outcome, Shutdown, run_until_interrupted};
use std::io::{self, BufReader};

fn main() -> Result<()> {
    let cli = CoprocessCli::parse();
    par_term_script_tools::debug::init_log_bridge(cli.log_level.map(|l| l.to_level_filter()));

    // Configuration errors are fatal before any input is read.
    let config = match CoprocessConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    log::info!(
        "par-term-coprocess {} starting in '{}' mode",
        par_term_script_tools::VERSION,
        config.mode().name()
    );

    let outcome = run_until_interrupted(Shutdown::new(), move |shutdown| {
        run_coprocess(
            &config,
            BufReader::new(io::stdin()),
            io::stdout(),
            &shutdown,
        )
    })?;

    match outcome {
        Outcome::Finished(Err(e)) => {
            log::error!("coprocess failed: {}", e);
            Err(e.into())
        }
        Outcome::Finished(Ok(())) => Ok(()),
        Outcome::Interrupted => {
            log::info!("interrupted");
            Ok(())
        }
    }
}
