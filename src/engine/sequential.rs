use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{EngineError, SourceError};
use crate::packet::{GapRecord, PacketRecord};

/// Records between checks of the run flag
const CANCEL_CHECK_INTERVAL: u64 = 65_536;

/// Single pass over the whole stream; the reference the batched engine must match
///
/// Returns the gaps in index order and the number of records read.
pub fn scan_stream<I>(
    source: I,
    threshold_seconds: f64,
    running: &AtomicBool,
) -> Result<(Vec<GapRecord>, u64), EngineError>
where
    I: IntoIterator<Item = Result<PacketRecord, SourceError>>,
{
    let mut gaps = Vec::new();
    let mut prev: Option<PacketRecord> = None;
    let mut index = 0u64;

    for record in source {
        let record = record.map_err(|source| EngineError::Source {
            packet: index + 1,
            source,
        })?;
        index += 1;

        if let Some(prev) = prev {
            if let Some(gap) = GapRecord::between(prev, record, index - 1, threshold_seconds) {
                gaps.push(gap);
            }
        }
        prev = Some(record);

        if index % CANCEL_CHECK_INTERVAL == 0 && !running.load(Ordering::Relaxed) {
            return Err(EngineError::Interrupted);
        }
    }

    if !running.load(Ordering::Relaxed) {
        return Err(EngineError::Interrupted);
    }

    Ok((gaps, index))
}
