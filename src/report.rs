use colored::*;

use crate::engine::{EngineMode, GapSet};
use crate::format::{format_duration, printable_timestamp, thousands};
use crate::packet::GapRecord;

const RULE: &str = "═══════════════════════════════════════════════════════════════";

// Longer gaps are highlighted red
const LONG_GAP_SECONDS: f64 = 3_600.0;

/// What the run was configured with, for the header section
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub file: String,
    pub file_size: u64,
    pub threshold_seconds: f64,
    pub batch_size: usize,
    pub workers: usize,
    pub mode: EngineMode,
    pub csv_output: Option<String>,
}

fn section(title: &str) {
    println!("{}", RULE.magenta().bold());
    println!("{}", format!("  {}", title).magenta().bold());
    println!("{}", RULE.magenta().bold());
}

pub fn print_header(info: &RunInfo) {
    section("PCAP Gap Detector");
    println!();
    println!("{} {}", "File:".cyan(), info.file);
    println!("{} {:.2} GB", "Size:".cyan(), info.file_size as f64 / (1024.0 * 1024.0 * 1024.0));
    println!("{} {} seconds", "Gap threshold:".cyan(), info.threshold_seconds);
    match info.mode {
        EngineMode::Parallel => {
            println!("{} {} packets", "Batch size:".cyan(), thousands(info.batch_size as u64));
            println!("{} {}", "Workers:".cyan(), info.workers);
        }
        EngineMode::Sequential => {
            println!("{} sequential (single pass)", "Engine:".cyan());
        }
    }
    if let Some(csv) = &info.csv_output {
        println!("{} {}", "CSV Export:".cyan(), csv);
    }
    println!();
}

pub fn print_results(gaps: &GapSet, threshold_seconds: f64) {
    println!();
    section("RESULTS");
    println!();

    if gaps.is_empty() {
        println!(
            "{}",
            format!("✓ No gaps found exceeding {}s threshold", threshold_seconds).green()
        );
        println!();
        return;
    }

    println!(
        "{}",
        format!("Found {} gap(s) exceeding {}s threshold:", gaps.buckets().total(), threshold_seconds).yellow()
    );
    println!();

    println!("{}", "Gap Summary:".bold());
    for (bucket, count) in gaps.buckets().iter() {
        if count > 0 {
            println!("  {}: {} gap(s)", bucket.label(), count);
        }
    }
    println!();

    println!("{}", "Detailed Gap List (sorted by duration):".bold());
    println!();
    for (i, gap) in gaps.by_duration().iter().enumerate() {
        print_gap(i + 1, gap);
    }
}

fn print_gap(number: usize, gap: &GapRecord) {
    let title = format!("Gap #{}:", number);
    let title = if gap.duration_seconds > LONG_GAP_SECONDS {
        title.red()
    } else {
        title.yellow()
    };

    println!("{}", title);
    println!("  Packets: {} → {}", gap.start_index, gap.end_index);
    println!("  From: {} UTC", printable_timestamp(&gap.start));
    println!("  To:   {} UTC", printable_timestamp(&gap.end));
    println!(
        "  Duration: {} ({:.2} seconds)",
        format_duration(gap.duration_seconds),
        gap.duration_seconds
    );
    println!();
}

pub fn print_statistics(gaps: &GapSet) {
    let stats = &gaps.stats;
    section("STATISTICS");
    println!();
    println!("{} {}", "Total packets processed:".green(), thousands(stats.total_packets));
    println!("{} {}", "Batches scanned:".green(), stats.batches);
    println!("{} {:.2} seconds", "Processing time:".green(), stats.elapsed.as_secs_f64());
    println!(
        "{} {} packets/second",
        "Processing rate:".green(),
        thousands(stats.packets_per_second().round() as u64)
    );
    println!();
}
