//! Error types for the gap detector.

use thiserror::Error;

/// Errors raised by the gap engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The record source failed before the end of the capture
    #[error("failed to read packet #{packet}: {source}")]
    Source {
        packet: u64,
        #[source]
        source: SourceError,
    },

    /// Rejected scan settings
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Cancelled by the user before all batches were scanned
    #[error("interrupted by user")]
    Interrupted,

    /// A scan worker thread panicked
    #[error("scan worker panicked")]
    WorkerPanic,
}

/// Errors produced while decoding packet records.
#[derive(Error, Debug)]
pub enum SourceError {
    /// libpcap reported an error, e.g. a truncated dump file
    #[error("pcap error: {0}")]
    Pcap(#[from] pcap::Error),

    /// Header carried a negative seconds or sub-seconds field
    #[error("negative timestamp field in packet header ({sec}s, {subsec})")]
    NegativeTimestamp { sec: i64, subsec: i64 },

    /// Timestamp does not fit in 64 bits at the capture resolution
    #[error("timestamp overflow ({sec}s at resolution {resolution})")]
    TimestampOverflow { sec: u64, resolution: u32 },
}

impl EngineError {
    /// Exit status the binary reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            EngineError::Interrupted => 130,
            _ => 1,
        }
    }
}
