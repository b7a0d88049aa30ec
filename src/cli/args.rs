//! Command-line argument definitions for the PKP Intercity GTFS converter
//!
//! This module defines the CLI interface using the clap derive API.

use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the PKP Intercity GTFS converter
///
/// Converts the PKP Intercity timetable export into a GTFS feed.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pkpic-gtfs",
    version,
    about = "Convert the PKP Intercity timetable export into a GTFS feed",
    long_about = "Reads the PKP Intercity timetable export (KPD_Rozklad.csv, either bare or inside \
                  its ZIP archive), splits trains at rail replacement bus sections, resolves stations \
                  against a stop directory and writes a zipped GTFS feed. Conversion is skipped when \
                  the upstream timetable has not changed since the last run."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Convert a timetable into a GTFS feed
    Convert(ConvertArgs),
    /// Summarise a stop directory
    Stops(StopsArgs),
}

/// Arguments for the convert command
#[derive(Debug, Clone, Default, Parser)]
pub struct ConvertArgs {
    /// Timetable CSV or the ZIP archive it ships in
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        help = "Timetable CSV or ZIP archive"
    )]
    pub input_path: Option<PathBuf>,

    /// Fetch the timetable from the carrier's FTPS server
    ///
    /// Credentials are read from INTERCITY_FTP_CREDENTIALS (user,password) or from
    /// the file named by INTERCITY_FTP_CREDENTIALS_PATH. Requires the `ftp` feature.
    #[arg(
        long = "ftp",
        conflicts_with = "input_path",
        help = "Fetch the timetable from the carrier's FTPS server"
    )]
    pub ftp: bool,

    /// Remote archive path on the FTPS server
    #[arg(long = "ftp-path", value_name = "PATH", requires = "ftp")]
    pub ftp_path: Option<String>,

    /// Stop directory CSV
    #[arg(
        short = 's',
        long = "stops",
        value_name = "FILE",
        help = "Stop directory CSV (stop_id,stop_name,stop_code,stop_lat,stop_lon)"
    )]
    pub stops_path: Option<PathBuf>,

    /// Directory receiving the GTFS text files
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Compressed feed location
    #[arg(long = "archive", value_name = "FILE")]
    pub archive_path: Option<PathBuf>,

    /// Report of stations missing from the stop directory
    #[arg(long = "missing-stops", value_name = "FILE")]
    pub missing_stops_path: Option<PathBuf>,

    /// Marker holding the version of the last converted timetable
    #[arg(long = "version-file", value_name = "FILE")]
    pub version_file: Option<PathBuf>,

    /// Convert even if the upstream timetable is unchanged
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Publisher name for feed_info.txt
    #[arg(long = "publisher-name", value_name = "NAME", requires = "publisher_url")]
    pub publisher_name: Option<String>,

    /// Publisher URL for feed_info.txt
    #[arg(long = "publisher-url", value_name = "URL", requires = "publisher_name")]
    pub publisher_url: Option<String>,

    /// Restart day rollover at every train/bus leg
    ///
    /// By default the previous departure carries over between the legs of a
    /// train, so a bus leg after midnight keeps counting past 24:00:00.
    #[arg(long = "reset-times-per-leg")]
    pub reset_times_per_leg: bool,

    /// Path to configuration file
    ///
    /// TOML file with any subset of the conversion settings. If not specified,
    /// looks for ~/.config/pkpic-gtfs/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for the run report
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Arguments for the stops command
#[derive(Debug, Clone, Parser)]
pub struct StopsArgs {
    /// Stop directory CSV
    #[arg(short = 's', long = "stops", value_name = "FILE")]
    pub stops_path: PathBuf,

    /// List every stop, not just the summary
    #[arg(long = "detailed")]
    pub detailed: bool,

    /// Output format for the report
    #[arg(long = "format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,

    /// Enable verbose logging output
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Output format options for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Result<Commands> {
        self.command
            .clone()
            .ok_or_else(|| Error::configuration("No command given"))
    }
}

impl ConvertArgs {
    /// Validate the convert arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if let Some(url) = &self.publisher_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::configuration(format!(
                    "Publisher URL must be an http(s) URL: {}",
                    url
                )));
            }
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl StopsArgs {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
