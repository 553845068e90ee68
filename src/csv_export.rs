use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use tracing::info;

use crate::format::{format_duration, printable_timestamp};
use crate::packet::GapRecord;

/// One exported row, in capture order
#[derive(Debug, Serialize)]
pub struct CsvGapRow {
    pub gap_number: usize,
    pub packet_start: u64,
    pub packet_end: u64,
    pub timestamp_start_utc: String,
    pub timestamp_end_utc: String,
    pub gap_seconds: String,
    pub gap_duration: String,
}

impl CsvGapRow {
    pub fn new(gap_number: usize, gap: &GapRecord) -> Self {
        Self {
            gap_number,
            packet_start: gap.start_index,
            packet_end: gap.end_index,
            timestamp_start_utc: printable_timestamp(&gap.start),
            timestamp_end_utc: printable_timestamp(&gap.end),
            gap_seconds: format!("{:.6}", gap.duration_seconds),
            gap_duration: format_duration(gap.duration_seconds),
        }
    }
}

/// Write `gaps` (already in index order) as CSV rows numbered from 1
pub fn write_gaps<W: Write>(out: W, gaps: &[GapRecord]) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    for (i, gap) in gaps.iter().enumerate() {
        writer.serialize(CsvGapRow::new(i + 1, gap))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_csv(path: &str, gaps: &[GapRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create CSV file: {}", path))?;
    write_gaps(file, gaps).with_context(|| format!("Failed to write CSV file: {}", path))?;
    info!("Exported {} gap(s) to {}", gaps.len(), path);
    Ok(())
}
