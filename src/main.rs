use clap::Parser;
use pkpic_gtfs::cli::{args::Args, commands};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Raised on Ctrl-C; the converter stops at the next train
        let cancel = Arc::new(AtomicBool::new(false));

        let shutdown_signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to install CTRL+C signal handler: {}", e);
                std::future::pending::<()>().await;
            }
            cancel.store(true, Ordering::Relaxed);
        };

        let run = commands::run(args, cancel.clone());
        tokio::pin!(run);

        tokio::select! {
            result = &mut run => {
                result
            }
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, stopping after the current train...");
                run.await
            }
        }
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("pkpic-gtfs - PKP Intercity timetable to GTFS converter");
    println!("======================================================");
    println!();
    println!("Convert the PKP Intercity timetable export (KPD_Rozklad.csv) into a");
    println!("GTFS feed with separate trips for rail replacement bus sections.");
    println!();
    println!("USAGE:");
    println!("    pkpic-gtfs <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    convert     Convert a timetable into a GTFS feed (main command)");
    println!("    stops       Summarise a stop directory");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Convert a downloaded archive:");
    println!("    pkpic-gtfs convert --input KPD_Rozklad.zip --stops stops.csv");
    println!();
    println!("    # Fetch from the carrier's FTPS server (built with --features ftp):");
    println!("    INTERCITY_FTP_CREDENTIALS=user,password pkpic-gtfs convert --ftp");
    println!();
    println!("    # Inspect a stop directory:");
    println!("    pkpic-gtfs stops --stops stops.csv --detailed");
    println!();
    println!("For detailed help on any command, use:");
    println!("    pkpic-gtfs <COMMAND> --help");
}
