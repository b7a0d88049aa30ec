//! Stops command implementation
//!
//! Loads a stop directory and prints a summary of it, optionally listing
//! every stop.

use super::convert::print_json;
use super::shared::setup_logging;
use crate::app::services::stop_registry::{LoadStats, StopRegistry};
use crate::cli::args::{OutputFormat, StopsArgs};
use crate::Result;
use colored::*;
use tracing::info;

/// Stops command runner
pub async fn run_stops(args: StopsArgs) -> Result<LoadStats> {
    setup_logging(args.get_log_level(), false)?;
    info!("Loading stop directory {}", args.stops_path.display());

    let (registry, stats) = StopRegistry::load_from_file(&args.stops_path)?;
    match args.output_format {
        OutputFormat::Human => generate_human_stop_report(&registry, &stats, args.detailed),
        OutputFormat::Json => generate_json_stop_report(&registry, &stats, args.detailed)?,
    }
    Ok(stats)
}

fn generate_human_stop_report(registry: &StopRegistry, stats: &LoadStats, detailed: bool) {
    println!("\n{}", "Stop Directory".bright_green().bold());
    println!("{}", "━".repeat(40));
    if let Some(path) = registry.source_path() {
        println!("   • File: {}", path.display());
    }
    println!(
        "   • Stops: {}",
        registry.stop_count().to_string().bright_white().bold()
    );
    println!("   • Secondary codes: {}", registry.alias_count());
    println!("   • Duplicate ids skipped: {}", stats.duplicates_skipped);

    if stats.has_errors() {
        println!(
            "   • {} rejected records:",
            stats.records_rejected().to_string().bright_red().bold()
        );
        for error in &stats.errors {
            println!("       {}", error);
        }
    }

    if detailed {
        println!("\n{}", "Stops:".bright_green());
        for stop in registry.stops_sorted() {
            let code = stop
                .stop_code
                .as_deref()
                .map(|code| format!(" [{}]", code))
                .unwrap_or_default();
            println!(
                "   {:>8}{} {} ({:.6}, {:.6})",
                stop.stop_id, code, stop.stop_name, stop.stop_lat, stop.stop_lon
            );
        }
    }
    println!();
}

fn generate_json_stop_report(
    registry: &StopRegistry,
    stats: &LoadStats,
    detailed: bool,
) -> Result<()> {
    let mut report = serde_json::json!({
        "file": registry.source_path().map(|path| path.display().to_string()),
        "stops": registry.stop_count(),
        "secondary_codes": registry.alias_count(),
        "duplicates_skipped": stats.duplicates_skipped,
        "rejected": stats.errors,
    });

    if detailed {
        report["stop_list"] = registry
            .stops_sorted()
            .into_iter()
            .map(|stop| {
                serde_json::json!({
                    "stop_id": stop.stop_id,
                    "stop_name": stop.stop_name,
                    "stop_code": stop.stop_code,
                    "stop_lat": stop.stop_lat,
                    "stop_lon": stop.stop_lon,
                })
            })
            .collect();
    }

    print_json(&report)
}
