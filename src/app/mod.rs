//! Application entry: command line, logging and the utterance loop.

pub mod setup;

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "heypi")]
#[command(about = "Keyword voice actions and a gesture button for a Raspberry Pi")]
#[command(version)]
pub struct Cli {
    /// Path to the config file (defaults to <config dir>/heypi/config.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run a single utterance and exit instead of reading stdin
    #[arg(short, long)]
    pub utterance: Option<String>,

    /// Do not listen to the gesture button
    #[arg(long)]
    pub no_gesture: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse arguments, set up logging and run until stdin closes or Ctrl+C.
/// Note: This function cannot be unit tested as it owns the process.
#[cfg_attr(coverage_nightly, coverage(off))]
pub fn run() {
    let cli = Cli::parse();
    setup::init_logging(cli.verbose);

    if let Err(e) = setup::run(cli) {
        crate::error!("{}", e);
        std::process::exit(1);
    }
}
