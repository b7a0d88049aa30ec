//! Command implementations for the PKP Intercity GTFS CLI
//!
//! Each command lives in its own module:
//! - `convert`: timetable to GTFS conversion with a run report
//! - `stops`: stop directory summary

pub mod convert;
pub mod shared;
pub mod stops;

use crate::Result;
use crate::cli::args::{Args, Commands};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Main command runner
///
/// Dispatches to the subcommand handler. `cancel` is raised by the binary on
/// Ctrl-C and checked by long-running commands between units of work.
pub async fn run(args: Args, cancel: Arc<AtomicBool>) -> Result<()> {
    match args.get_command()? {
        Commands::Convert(convert_args) => {
            convert::run_convert(convert_args, cancel).await?;
        }
        Commands::Stops(stops_args) => {
            stops::run_stops(stops_args).await?;
        }
    }
    Ok(())
}
