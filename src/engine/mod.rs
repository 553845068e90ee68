// Batched gap scanning: partition, scan in parallel, stitch boundaries
pub mod aggregate;
pub mod batch;
pub mod config;
pub mod pool;
pub mod reconcile;
pub mod scan;
pub mod sequential;

pub use aggregate::*;
pub use batch::*;
pub use config::*;
pub use pool::*;
pub use reconcile::*;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::info;

use crate::error::{EngineError, SourceError};
use crate::packet::PacketRecord;

/// Which engine variant processes the capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    Parallel,
    Sequential,
}

/// Runs one gap analysis over a record source
pub struct GapScanner {
    config: ScanConfig,
    running: Arc<AtomicBool>,
}

impl GapScanner {
    pub fn new(config: ScanConfig, running: Arc<AtomicBool>) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config, running })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Signal every stage to stop; the run then fails with `Interrupted`
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn run<I>(&self, mode: EngineMode, source: I) -> Result<GapSet, EngineError>
    where
        I: Iterator<Item = Result<PacketRecord, SourceError>>,
    {
        match mode {
            EngineMode::Parallel => self.run_parallel(source),
            EngineMode::Sequential => self.run_sequential(source),
        }
    }

    /// Partition the source into batches and scan them on the worker pool
    pub fn run_parallel<I>(&self, source: I) -> Result<GapSet, EngineError>
    where
        I: Iterator<Item = Result<PacketRecord, SourceError>>,
    {
        let start_time = Instant::now();
        let threshold = self.config.threshold_seconds;
        let pool = ScanPool::new(self.config.workers.resolve(), self.config.pin_workers, &self.running);
        let mut partitioner = BatchPartitioner::new(source, self.config.batch_size);

        info!("Phase 1: Reading and scanning batches...");
        let results = pool.run(partitioner.by_ref(), threshold)?;
        info!(
            "Scanned {} packets in {} batches with {} workers",
            partitioner.records_seen(),
            partitioner.batches_emitted(),
            pool.worker_count()
        );

        info!("Phase 2: Reconciling batch boundaries...");
        let boundary = reconcile_boundaries(&results, threshold);
        info!("Found {} gap(s) spanning batch boundaries", boundary.len());

        let stats = RunStats {
            total_packets: partitioner.records_seen(),
            batches: results.len(),
            elapsed: start_time.elapsed(),
        };
        Ok(GapSet::assemble(results, boundary, stats))
    }

    /// Scan the whole source in one pass on the calling thread
    pub fn run_sequential<I>(&self, source: I) -> Result<GapSet, EngineError>
    where
        I: Iterator<Item = Result<PacketRecord, SourceError>>,
    {
        let start_time = Instant::now();

        info!("Phase 1: Reading and scanning packets sequentially...");
        let (gaps, total_packets) =
            sequential::scan_stream(source, self.config.threshold_seconds, &self.running)?;
        info!("Scanned {} packets", total_packets);

        let stats = RunStats {
            total_packets,
            batches: usize::from(total_packets > 0),
            elapsed: start_time.elapsed(),
        };
        Ok(GapSet::from_gaps(gaps, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::GapRecord;
    use proptest::prelude::*;
    use std::sync::atomic::AtomicUsize;

    fn records(seconds: &[u64]) -> Vec<Result<PacketRecord, SourceError>> {
        seconds.iter().map(|&s| Ok(PacketRecord::new(s, 1))).collect()
    }

    fn scanner(threshold: f64, batch_size: usize, workers: usize) -> GapScanner {
        let config = ScanConfig::new(threshold)
            .with_batch_size(batch_size)
            .with_workers(Workers::Fixed(workers));
        GapScanner::new(config, Arc::new(AtomicBool::new(true))).unwrap()
    }

    fn indices(gaps: &[GapRecord]) -> Vec<(u64, u64)> {
        gaps.iter().map(|g| (g.start_index, g.end_index)).collect()
    }

    #[test]
    fn test_example_single_batch() {
        let set = scanner(10.0, 100_000, 2)
            .run_parallel(records(&[0, 1, 2, 50, 51]).into_iter())
            .unwrap();

        assert_eq!(indices(set.by_index()), vec![(3, 4)]);
        assert_eq!(set.by_index()[0].duration_seconds, 48.0);
        assert_eq!(set.buckets().get(DurationBucket::UnderMinute), 1);
        assert_eq!(set.buckets().get(DurationBucket::MinuteToHour), 0);
        assert_eq!(set.buckets().get(DurationBucket::HourToDay), 0);
        assert_eq!(set.buckets().get(DurationBucket::DayOrMore), 0);
        assert_eq!(set.stats.total_packets, 5);
        assert_eq!(set.stats.batches, 1);
    }

    #[test]
    fn test_example_boundary_spanning() {
        let set = scanner(10.0, 3, 2)
            .run_parallel(records(&[0, 1, 2, 50, 51]).into_iter())
            .unwrap();

        assert_eq!(set.stats.batches, 2);
        assert_eq!(indices(set.by_index()), vec![(3, 4)]);
        assert_eq!(set.by_index()[0].duration_seconds, 48.0);
    }

    #[test]
    fn test_short_trailing_batch_counts_and_reconciles() {
        let set = scanner(10.0, 4, 3)
            .run_parallel(records(&[0, 1, 2, 3, 100]).into_iter())
            .unwrap();

        assert_eq!(set.stats.total_packets, 5);
        assert_eq!(indices(set.by_index()), vec![(4, 5)]);
    }

    #[test]
    fn test_no_gap_case() {
        let seconds: Vec<u64> = (0..5_000).collect();
        let set = scanner(2.0, 64, 4).run_parallel(records(&seconds).into_iter()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.stats.total_packets, 5_000);
    }

    #[test]
    fn test_threshold_plus_epsilon() {
        let source = vec![
            Ok(PacketRecord::new(0, 1_000_000)),
            Ok(PacketRecord::new(10_000_000, 1_000_000)),
            Ok(PacketRecord::new(20_000_001, 1_000_000)),
        ];
        let set = scanner(10.0, 2, 1).run_parallel(source.into_iter()).unwrap();
        assert_eq!(indices(set.by_index()), vec![(2, 3)]);
    }

    #[test]
    fn test_interrupted_run_yields_no_report() {
        let scanner = scanner(1.0, 10, 2);
        scanner.stop();
        let seconds: Vec<u64> = (0..1_000).map(|i| i * 5).collect();
        assert!(matches!(
            scanner.run(EngineMode::Parallel, records(&seconds).into_iter()),
            Err(EngineError::Interrupted)
        ));
        assert!(matches!(
            scanner.run(EngineMode::Sequential, records(&seconds).into_iter()),
            Err(EngineError::Interrupted)
        ));
    }

    /// Yields evenly spaced records and clears the run flag once `stop_after`
    /// of them have been handed out, the way Ctrl-C lands during a read
    struct StoppingSource {
        next: u64,
        total: u64,
        stop_after: u64,
        running: Arc<AtomicBool>,
        consumed: Arc<AtomicUsize>,
    }

    impl Iterator for StoppingSource {
        type Item = Result<PacketRecord, SourceError>;

        fn next(&mut self) -> Option<Self::Item> {
            if self.next == self.total {
                return None;
            }
            self.next += 1;
            self.consumed.fetch_add(1, Ordering::Relaxed);
            if self.next == self.stop_after {
                self.running.store(false, Ordering::Relaxed);
            }
            Some(Ok(PacketRecord::new(self.next * 5, 1)))
        }
    }

    fn stopping_scanner(total: u64, stop_after: u64) -> (GapScanner, StoppingSource, Arc<AtomicUsize>) {
        let running = Arc::new(AtomicBool::new(true));
        let consumed = Arc::new(AtomicUsize::new(0));
        let config = ScanConfig::new(1.0)
            .with_batch_size(10)
            .with_workers(Workers::Fixed(3));
        let scanner = GapScanner::new(config, running.clone()).unwrap();
        let source = StoppingSource {
            next: 0,
            total,
            stop_after,
            running,
            consumed: consumed.clone(),
        };
        (scanner, source, consumed)
    }

    #[test]
    fn test_stop_during_parallel_read() {
        let (scanner, source, consumed) = stopping_scanner(100_000, 500);
        assert!(matches!(scanner.run_parallel(source), Err(EngineError::Interrupted)));
        assert!(consumed.load(Ordering::Relaxed) < 100_000);
    }

    #[test]
    fn test_stop_during_sequential_read() {
        // Long enough to reach the periodic flag check inside the loop
        let (scanner, source, consumed) = stopping_scanner(100_000, 500);
        assert!(matches!(scanner.run_sequential(source), Err(EngineError::Interrupted)));
        assert!(consumed.load(Ordering::Relaxed) < 100_000);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ScanConfig::new(-2.0);
        assert!(matches!(
            GapScanner::new(config, Arc::new(AtomicBool::new(true))),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    fn stream_strategy() -> impl Strategy<Value = Vec<u64>> {
        prop::collection::vec(0u64..40, 0..400).prop_map(|steps| {
            let mut t = 0u64;
            steps
                .into_iter()
                .map(|step| {
                    t += step;
                    t
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn test_parallel_matches_sequential(
            seconds in stream_strategy(),
            batch_size in 1usize..64,
            workers in 1usize..6,
            threshold in 1u32..30,
        ) {
            let threshold = f64::from(threshold);
            let reference = scanner(threshold, batch_size, workers)
                .run_sequential(records(&seconds).into_iter())
                .unwrap();
            let parallel = scanner(threshold, batch_size, workers)
                .run_parallel(records(&seconds).into_iter())
                .unwrap();

            prop_assert_eq!(parallel.by_index(), reference.by_index());
            prop_assert_eq!(parallel.buckets(), reference.buckets());
            prop_assert_eq!(parallel.stats.total_packets, seconds.len() as u64);
        }

        #[test]
        fn test_batch_size_invariance(
            seconds in stream_strategy(),
            small in 1usize..16,
            large in 16usize..512,
        ) {
            let a = scanner(10.0, small, 3).run_parallel(records(&seconds).into_iter()).unwrap();
            let b = scanner(10.0, large, 2).run_parallel(records(&seconds).into_iter()).unwrap();
            prop_assert_eq!(a.by_index(), b.by_index());
            prop_assert_eq!(a.by_duration(), b.by_duration());
        }

        #[test]
        fn test_index_contiguity(seconds in stream_strategy(), batch_size in 1usize..32) {
            let set = scanner(5.0, batch_size, 2).run_parallel(records(&seconds).into_iter()).unwrap();
            for gap in set.by_index() {
                prop_assert_eq!(gap.end_index, gap.start_index + 1);
                prop_assert!(gap.start_index >= 1);
                prop_assert!(gap.end_index <= set.stats.total_packets);
            }
        }
    }
}
