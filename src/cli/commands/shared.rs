//! Shared components for CLI commands
//!
//! Logging setup, layered configuration loading and progress reporting used
//! by more than one command.

use crate::cli::args::ConvertArgs;
use crate::config::{ConvertConfig, DayRolloverPolicy, PublisherInfo};
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{debug, info};

/// Set up structured logging on stderr
///
/// `RUST_LOG` takes precedence over the level derived from the flags.
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pkpic_gtfs={}", log_level)));

    let initialised = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    // A subscriber installed earlier in the process keeps working
    if initialised.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
    Ok(())
}

/// Load configuration using a layered approach (defaults -> file -> args)
pub fn load_configuration(args: &ConvertArgs) -> Result<ConvertConfig> {
    let default_config_path = if args.config_file.is_none() {
        ConvertConfig::default_config_path().ok()
    } else {
        None
    };

    let config_file = match &args.config_file {
        Some(path) => Some(path.as_path()),
        None => default_config_path
            .as_ref()
            .filter(|path| path.exists())
            .map(|path| path.as_path()),
    };

    let mut config = match config_file {
        Some(path) => {
            info!("Using config file: {}", path.display());
            ConvertConfig::load_from_file(path)?
        }
        None => {
            debug!("No config file found, using defaults");
            ConvertConfig::default()
        }
    };

    apply_cli_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut ConvertConfig, args: &ConvertArgs) {
    if let Some(path) = &args.input_path {
        config.timetable_path = Some(path.clone());
        config.use_ftp = false;
    }
    if args.ftp {
        config.use_ftp = true;
    }
    if let Some(remote_path) = &args.ftp_path {
        config.ftp_remote_path = remote_path.clone();
    }
    if let Some(path) = &args.stops_path {
        config.stops_path = path.clone();
    }
    if let Some(path) = &args.output_dir {
        config.output_dir = path.clone();
    }
    if let Some(path) = &args.archive_path {
        config.archive_path = path.clone();
    }
    if let Some(path) = &args.missing_stops_path {
        config.missing_stops_path = path.clone();
    }
    if let Some(path) = &args.version_file {
        config.version_file = path.clone();
    }
    if let (Some(name), Some(url)) = (&args.publisher_name, &args.publisher_url) {
        config.publisher = Some(PublisherInfo::new(name, url));
    }
    if args.reset_times_per_leg {
        config.day_rollover = DayRolloverPolicy::ResetPerLeg;
    }
    if args.force {
        config.force = true;
    }
}

/// Create a spinner counting processed trains
pub fn create_progress_bar(message: &str, visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} trains {msg}")
            .map_err(|e| Error::configuration(format!("Invalid progress template: {}", e)))?,
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

/// Format a byte count in human-readable form
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
