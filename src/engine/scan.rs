use crate::engine::batch::Batch;
use crate::packet::{GapRecord, PacketRecord};

/// Outcome of scanning a single batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub sequence: usize,
    pub gaps: Vec<GapRecord>, // Intra-batch gaps, in index order
    pub first: PacketRecord,
    pub last: PacketRecord,
    pub count: usize,
}

/// Scan one batch for gaps between adjacent records
///
/// Consumes the batch. Batches with a single record have no adjacent pair
/// and produce no gaps, but still report their endpoints so the boundary
/// pass can compare them with their neighbours. Returns `None` only for an
/// empty batch, which the partitioner never produces.
pub fn scan_batch(batch: Batch, threshold_seconds: f64) -> Option<BatchResult> {
    if batch.is_empty() {
        return None;
    }
    let count = batch.len();
    let first = batch.records[0];
    let last = batch.records[count - 1];

    let gaps = batch
        .records
        .windows(2)
        .enumerate()
        .filter_map(|(offset, pair)| {
            GapRecord::between(pair[0], pair[1], batch.start_index + offset as u64, threshold_seconds)
        })
        .collect();

    Some(BatchResult {
        sequence: batch.sequence,
        gaps,
        first,
        last,
        count,
    })
}
