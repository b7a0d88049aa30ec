//! Convert command implementation
//!
//! Loads the layered configuration, runs the blocking converter off the async
//! runtime and prints a report of the run.

use super::shared::{create_progress_bar, format_size, load_configuration, setup_logging};
use crate::app::services::converter::{ConversionReport, Converter, RunOutcome};
use crate::cli::args::{ConvertArgs, OutputFormat};
use crate::{Error, Result};
use colored::*;
use indicatif::HumanDuration;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{debug, info};

/// Convert command runner
///
/// 1. Set up logging and load configuration
/// 2. Run the conversion on a blocking thread
/// 3. Report the outcome
pub async fn run_convert(args: ConvertArgs, cancel: Arc<AtomicBool>) -> Result<RunOutcome> {
    setup_logging(args.get_log_level(), args.quiet)?;
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = load_configuration(&args)?;
    debug!("Loaded configuration: {:?}", config);

    let progress = create_progress_bar("converting", args.show_progress())?;
    let converter = Converter::new(config)?
        .with_cancel_flag(cancel)
        .with_progress(progress.clone());

    let outcome = tokio::task::spawn_blocking(move || converter.run())
        .await
        .map_err(|e| Error::processing_interrupted(format!("Conversion task failed: {}", e)))?;
    progress.finish_and_clear();
    let outcome = outcome?;

    if !args.quiet || args.output_format == OutputFormat::Json {
        report(&outcome, args.output_format)?;
    }
    Ok(outcome)
}

fn report(outcome: &RunOutcome, format: OutputFormat) -> Result<()> {
    match (outcome, format) {
        (RunOutcome::Skipped { version }, OutputFormat::Human) => {
            println!(
                "{} timetable version {} is already converted (use --force to convert again)",
                "Up to date:".bright_green().bold(),
                version.bright_white()
            );
            Ok(())
        }
        (RunOutcome::Skipped { version }, OutputFormat::Json) => print_json(&serde_json::json!({
            "status": "skipped",
            "version": version,
        })),
        (RunOutcome::Converted(report), OutputFormat::Human) => {
            generate_human_report(report);
            Ok(())
        }
        (RunOutcome::Converted(report), OutputFormat::Json) => generate_json_report(report),
    }
}

fn generate_human_report(report: &ConversionReport) {
    info!("Generating final report");
    let feed = &report.feed;

    println!("\n{}", "GTFS Conversion Complete".bright_green().bold());
    println!("{}", "━".repeat(40));
    println!(
        "   • Timetable version: {}",
        report.version.bright_white().bold()
    );
    if let Some(previous) = &report.previous_version {
        println!("   • Previous version: {}", previous);
    }
    if report.forced {
        println!("   • {}", "Forced conversion".yellow());
    }
    println!(
        "   • Rows read: {} ({:.1}% by bus)",
        report.read.records_read,
        report.read.bus_share()
    );
    println!(
        "   • Trains: {} emitted, {} skipped, {} split at bus sections",
        feed.trains_emitted.to_string().bright_white().bold(),
        feed.trains_skipped,
        feed.multi_leg_trains
    );
    println!(
        "   • Trips: {}, stop times: {}, transfers: {}",
        feed.trips, feed.stop_times, feed.transfers
    );
    println!("   • Stops in directory: {}", report.stops.stops_loaded);

    if report.missing_stops > 0 {
        println!(
            "   • {} {} stations missing from the stop directory ({} stop times dropped)",
            "⚠".yellow(),
            report.missing_stops.to_string().bright_red().bold(),
            feed.stop_times_dropped
        );
    }
    if feed.name_mismatches > 0 {
        println!("   • Station name mismatches: {}", feed.name_mismatches);
    }
    println!("   • Processing time: {}", HumanDuration(report.duration));

    println!("\n{}", "Output Files:".bright_green());
    for (name, size) in &report.files.files {
        println!("   • {}: {}", name, format_size(*size));
    }
    println!(
        "   • {} ({} files)",
        report.archive_path.display(),
        report.archive_entries
    );
    println!();
}

fn generate_json_report(report: &ConversionReport) -> Result<()> {
    print_json(&serde_json::json!({
        "status": "converted",
        "version": report.version,
        "previous_version": report.previous_version,
        "forced": report.forced,
        "read": report.read,
        "stops_loaded": report.stops.stops_loaded,
        "feed": report.feed,
        "missing_stops": report.missing_stops,
        "processing_time_seconds": report.duration.as_secs_f64(),
        "archive": report.archive_path.display().to_string(),
        "output_files": report.files.files.iter().map(|(name, size)| {
            serde_json::json!({
                "filename": name,
                "size_bytes": size
            })
        }).collect::<Vec<_>>()
    }))
}

pub(super) fn print_json(value: &serde_json::Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| Error::data_validation(format!("Failed to render JSON report: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}
