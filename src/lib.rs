// heypi: keyword voice actions and a gesture button for a Raspberry Pi

// Enable coverage attribute on nightly for explicit exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod app;
pub mod config;
pub mod events;
pub mod gesture;
pub mod speaker;
pub mod voice_commands;

// Re-export log macros for use throughout the crate
pub use log::{debug, error, info, trace, warn};

pub use app::Cli;

/// Application entry point - parses the command line and runs until exit.
/// Note: This function cannot be unit tested as it owns the process.
#[cfg_attr(coverage_nightly, coverage(off))]
pub fn run() {
    app::run()
}
