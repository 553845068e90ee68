use anyhow::{Context, Result};
use pcap::{Capture, Error as PcapError, Offline, Precision};
use std::path::Path;
use tracing::debug;

use crate::error::SourceError;
use crate::packet::PacketRecord;

/// Timestamp precision the capture is opened with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPrecision {
    Micro,
    Nano,
}

impl TimestampPrecision {
    /// Ticks per second of the sub-second header field
    pub fn resolution(&self) -> u32 {
        match self {
            TimestampPrecision::Micro => 1_000_000,
            TimestampPrecision::Nano => 1_000_000_000,
        }
    }
}

/// Forward-only source of packet timestamps backed by libpcap
pub struct PcapReader {
    capture: Capture<Offline>,
    resolution: u32,
    sequence: u64,
    finished: bool,
}

impl PcapReader {
    pub fn new(file_path: &str, precision: TimestampPrecision) -> Result<Self> {
        debug!("Opening PCAP file with libpcap: {} ({:?} precision)", file_path, precision);

        let path = Path::new(file_path);
        let capture = match precision {
            TimestampPrecision::Micro => Capture::from_file(path),
            TimestampPrecision::Nano => Capture::from_file_with_precision(path, Precision::Nano),
        }
        .with_context(|| format!("Failed to open PCAP file: {}", file_path))?;

        Ok(Self {
            capture,
            resolution: precision.resolution(),
            sequence: 0,
            finished: false,
        })
    }

    /// Size of the capture file on disk
    pub fn file_size(file_path: &str) -> Result<u64> {
        let metadata = std::fs::metadata(file_path)
            .with_context(|| format!("Failed to stat PCAP file: {}", file_path))?;
        Ok(metadata.len())
    }

    fn next_record(&mut self) -> Result<Option<PacketRecord>, SourceError> {
        let packet = match self.capture.next_packet() {
            Ok(packet) => packet,
            Err(PcapError::NoMorePackets) => return Ok(None),
            Err(e) => return Err(SourceError::Pcap(e)),
        };

        let sec = i64::from(packet.header.ts.tv_sec);
        let subsec = i64::from(packet.header.ts.tv_usec);
        let record = to_record(sec, subsec, self.resolution)?;
        self.sequence += 1;

        Ok(Some(record))
    }
}

impl Iterator for PcapReader {
    type Item = Result<PacketRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                debug!("Reached end of capture after {} packets", self.sequence);
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Fold a pcap header timestamp into a single integer at `resolution`
fn to_record(sec: i64, subsec: i64, resolution: u32) -> Result<PacketRecord, SourceError> {
    let (Ok(whole), Ok(frac)) = (u64::try_from(sec), u64::try_from(subsec)) else {
        return Err(SourceError::NegativeTimestamp { sec, subsec });
    };

    let timestamp = whole
        .checked_mul(u64::from(resolution))
        .and_then(|t| t.checked_add(frac))
        .ok_or(SourceError::TimestampOverflow { sec: whole, resolution })?;

    Ok(PacketRecord::new(timestamp, resolution))
}
