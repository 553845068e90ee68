use crate::engine::scan::BatchResult;
use crate::packet::GapRecord;

/// Find gaps whose endpoints fall in neighbouring batches
///
/// `results` must be ordered by batch sequence number. Each boundary compares
/// the last record of one batch with the first record of the next, using the
/// same test as the per-batch scan. The start index of a boundary gap is the
/// number of records in every batch up to and including the left one.
pub fn reconcile_boundaries(results: &[BatchResult], threshold_seconds: f64) -> Vec<GapRecord> {
    let mut gaps = Vec::new();
    let mut offset = 0u64;

    for pair in results.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        debug_assert_eq!(prev.sequence + 1, curr.sequence, "results out of order");

        offset += prev.count as u64;
        if let Some(gap) = GapRecord::between(prev.last, curr.first, offset, threshold_seconds) {
            gaps.push(gap);
        }
    }

    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::batch::Batch;
    use crate::engine::scan::scan_batch;
    use crate::packet::PacketRecord;

    fn results(batches: &[&[u64]]) -> Vec<BatchResult> {
        let mut start_index = 1;
        batches
            .iter()
            .enumerate()
            .map(|(sequence, seconds)| {
                let batch = Batch {
                    sequence,
                    start_index,
                    records: seconds.iter().map(|&s| PacketRecord::new(s, 1)).collect(),
                };
                start_index = batch.next_index();
                scan_batch(batch, 10.0).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_gap_straddling_boundary() {
        let results = results(&[&[0, 1, 2], &[50, 51]]);
        assert!(results.iter().all(|r| r.gaps.is_empty()));

        let gaps = reconcile_boundaries(&results, 10.0);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].start_index, 3);
        assert_eq!(gaps[0].end_index, 4);
        assert_eq!(gaps[0].duration_seconds, 48.0);
    }

    #[test]
    fn test_single_result_is_noop() {
        let results = results(&[&[0, 100, 200]]);
        assert!(reconcile_boundaries(&results, 10.0).is_empty());
        assert!(reconcile_boundaries(&[], 10.0).is_empty());
    }

    #[test]
    fn test_offsets_accumulate_across_short_batches() {
        let results = results(&[&[0, 1], &[2], &[100, 101], &[500]]);
        let gaps = reconcile_boundaries(&results, 10.0);
        let starts: Vec<u64> = gaps.iter().map(|g| g.start_index).collect();
        assert_eq!(starts, vec![3, 5]);
    }

    #[test]
    fn test_boundary_at_exact_threshold_is_skipped() {
        let results = results(&[&[0, 5], &[15, 16]]);
        assert!(reconcile_boundaries(&results, 10.0).is_empty());
    }
}
