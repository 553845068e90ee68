use anyhow::{Result, bail};
use clap::Parser;
use colored::*;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{info, warn};

mod csv_export;
mod engine;
mod error;
mod format;
mod packet;
mod pcap_reader;
mod report;

use engine::{EngineMode, GapScanner, ScanConfig, Workers};
use error::EngineError;
use pcap_reader::{PcapReader, TimestampPrecision};
use report::RunInfo;

#[derive(Parser, Debug)]
#[command(name = "pcap-gap-detector")]
#[command(about = "Find gaps between consecutive packet timestamps in a PCAP file")]
#[command(after_help = "Examples:\n  \
    pcap-gap-detector --pcap capture.pcap --seconds 5\n  \
    pcap-gap-detector --pcap large.pcap --seconds 10 --batchsize 200000 --workers 8")]
struct Args {
    /// Path to PCAP file
    #[arg(long, value_name = "PCAP")]
    pcap: String,

    /// Gap threshold in seconds
    #[arg(long, value_name = "SECONDS")]
    seconds: f64,

    /// Packets per batch
    #[arg(long, value_name = "SIZE", default_value = "100000")]
    batchsize: usize,

    /// Number of parallel workers (default: CPU count)
    #[arg(long, value_name = "COUNT")]
    workers: Option<usize>,

    /// Scan in a single sequential pass instead of parallel batches
    #[arg(long, default_value = "false")]
    sequential: bool,

    /// Open the capture with nanosecond timestamp precision
    #[arg(long, default_value = "false")]
    nanosecond: bool,

    /// Pin scan workers to CPU cores
    #[arg(long, default_value = "false")]
    pin_cores: bool,

    /// Disable colored output
    #[arg(long, default_value = "false")]
    no_color: bool,

    /// Export gaps to CSV file (sortable by packet number or timestamp)
    #[arg(long = "csv", value_name = "OUTPUT.CSV")]
    csv_output: Option<String>,

    /// Verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(&args) {
        let code = e.downcast_ref::<EngineError>().map_or(1, EngineError::exit_code);
        if code == EngineError::Interrupted.exit_code() {
            println!("\n{}", "Interrupted by user".yellow());
        } else {
            eprintln!("{}", format!("Error: {:#}", e).red());
        }
        std::process::exit(code);
    }
}

fn run(args: &Args) -> Result<()> {
    if !Path::new(&args.pcap).is_file() {
        bail!("\"{}\" does not exist", args.pcap);
    }

    let config = ScanConfig::new(args.seconds)
        .with_batch_size(args.batchsize)
        .with_workers(Workers::from(args.workers))
        .with_pinning(args.pin_cores);

    let scanner = Arc::new(GapScanner::new(config, Arc::new(AtomicBool::new(true)))?);

    // Setup graceful shutdown
    let scanner_for_shutdown = scanner.clone();
    ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down...");
        scanner_for_shutdown.stop();
    })?;

    let mode = if args.sequential { EngineMode::Sequential } else { EngineMode::Parallel };
    let precision = if args.nanosecond { TimestampPrecision::Nano } else { TimestampPrecision::Micro };

    let reader = PcapReader::new(&args.pcap, precision)?;
    report::print_header(&RunInfo {
        file: args.pcap.clone(),
        file_size: PcapReader::file_size(&args.pcap)?,
        threshold_seconds: scanner.config().threshold_seconds,
        batch_size: scanner.config().batch_size,
        workers: scanner.config().workers.resolve(),
        mode,
        csv_output: args.csv_output.clone(),
    });

    let gaps = scanner.run(mode, reader)?;

    if let Some(path) = &args.csv_output {
        if gaps.is_empty() {
            info!("No gaps to export, skipping CSV");
        } else {
            info!("Phase 3: Exporting to CSV...");
            match csv_export::export_csv(path, gaps.by_index()) {
                Ok(()) => println!("{}", format!("  ✓ CSV exported successfully to {}", path).green()),
                Err(e) => {
                    warn!("CSV export failed: {:#}", e);
                    println!("{}", format!("  ✗ Failed to export CSV: {:#}", e).red());
                }
            }
        }
    }

    report::print_results(&gaps, scanner.config().threshold_seconds);
    report::print_statistics(&gaps);

    Ok(())
}
