use crossbeam::channel;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::engine::batch::Batch;
use crate::engine::scan::{scan_batch, BatchResult};
use crate::error::EngineError;

/// Batches are logged at info level every this many submissions
const PROGRESS_INTERVAL: usize = 10;

/// Fixed-size pool of scan workers fed from a bounded task queue
///
/// Workers share nothing but the task and result channels and the run flag.
/// Results are returned in batch sequence order regardless of the order in
/// which workers finish.
pub struct ScanPool<'a> {
    worker_count: usize,
    pin_workers: bool,
    queue_depth: usize,
    running: &'a AtomicBool,
}

impl<'a> ScanPool<'a> {
    pub fn new(worker_count: usize, pin_workers: bool, running: &'a AtomicBool) -> Self {
        let worker_count = worker_count.max(1);
        Self {
            worker_count,
            pin_workers,
            queue_depth: worker_count * 2,
            running,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Scan every batch produced by `batches`
    ///
    /// `batches` is drained on the calling thread. Returns once all submitted
    /// batches have been scanned, or the first source error, or
    /// `Interrupted` when the run flag is cleared mid-way.
    pub fn run<I>(&self, batches: I, threshold_seconds: f64) -> Result<Vec<BatchResult>, EngineError>
    where
        I: Iterator<Item = Result<Batch, EngineError>>,
    {
        let (task_tx, task_rx) = channel::bounded::<Batch>(self.queue_depth);
        let (result_tx, result_rx) = channel::unbounded::<BatchResult>();

        let core_ids = if self.pin_workers {
            match core_affinity::get_core_ids() {
                Some(ids) if !ids.is_empty() => {
                    info!("Detected {} CPU cores for affinity", ids.len());
                    Some(ids)
                }
                _ => {
                    info!("CPU affinity not supported on this platform, continuing without core pinning");
                    None
                }
            }
        } else {
            None
        };

        let running = self.running;
        let scoped = crossbeam::scope(|scope| {
            for worker_id in 0..self.worker_count {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                let core = core_ids.as_ref().map(|cores| cores[worker_id % cores.len()]);

                scope.spawn(move |_| {
                    if let Some(core) = core {
                        if core_affinity::set_for_current(core) {
                            debug!("Worker {} pinned to CPU core {}", worker_id, core.id);
                        } else {
                            debug!("Failed to set CPU affinity for worker {}", worker_id);
                        }
                    }

                    let mut scanned = 0usize;
                    for batch in task_rx.iter() {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        let Some(result) = scan_batch(batch, threshold_seconds) else {
                            continue;
                        };
                        if result_tx.send(result).is_err() {
                            break;
                        }
                        scanned += 1;
                    }

                    debug!("Worker {} shutting down after {} batches", worker_id, scanned);
                });
            }

            // Only the workers hold these now
            drop(task_rx);
            drop(result_tx);

            info!("Started {} scan workers", self.worker_count);

            let submitted = self.submit(batches, &task_tx);
            drop(task_tx);

            let mut slots: Vec<Option<BatchResult>> = Vec::new();
            for result in result_rx.iter() {
                let sequence = result.sequence;
                if sequence >= slots.len() {
                    slots.resize_with(sequence + 1, || None);
                }
                slots[sequence] = Some(result);
            }

            (submitted, slots)
        });

        let (submitted, slots) = scoped.map_err(|_| EngineError::WorkerPanic)?;
        let submitted = submitted?;

        if !running.load(Ordering::Relaxed) {
            return Err(EngineError::Interrupted);
        }

        let results: Option<Vec<BatchResult>> = slots.into_iter().collect();
        match results {
            Some(results) if results.len() == submitted => Ok(results),
            _ => {
                warn!("Scan pool returned incomplete results for {} batches", submitted);
                Err(EngineError::WorkerPanic)
            }
        }
    }

    /// Feed batches into the task queue, returning how many were queued
    fn submit<I>(&self, batches: I, task_tx: &channel::Sender<Batch>) -> Result<usize, EngineError>
    where
        I: Iterator<Item = Result<Batch, EngineError>>,
    {
        let mut submitted = 0usize;

        for batch in batches {
            if !self.running.load(Ordering::Relaxed) {
                return Err(EngineError::Interrupted);
            }

            let batch = batch?;
            let packets_read = batch.next_index() - 1;
            if task_tx.send(batch).is_err() {
                // Every worker has exited
                return if self.running.load(Ordering::Relaxed) {
                    Err(EngineError::WorkerPanic)
                } else {
                    Err(EngineError::Interrupted)
                };
            }
            submitted += 1;

            if submitted % PROGRESS_INTERVAL == 0 {
                info!("Packets read: {} | Batches: {}", packets_read, submitted);
            } else {
                debug!("Packets read: {} | Batches: {}", packets_read, submitted);
            }
        }

        Ok(submitted)
    }
}
