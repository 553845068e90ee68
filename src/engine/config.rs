use crate::error::EngineError;

pub const DEFAULT_BATCH_SIZE: usize = 100_000;

/// Worker count for the scan pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workers {
    /// One worker per logical CPU
    Auto,
    Fixed(usize),
}

impl Workers {
    pub fn resolve(&self) -> usize {
        match self {
            Workers::Auto => num_cpus::get().max(1),
            Workers::Fixed(count) => *count,
        }
    }
}

impl From<Option<usize>> for Workers {
    fn from(count: Option<usize>) -> Self {
        match count {
            Some(count) => Workers::Fixed(count),
            None => Workers::Auto,
        }
    }
}

/// Settings consumed by the gap engine
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub batch_size: usize,
    pub threshold_seconds: f64,
    pub workers: Workers,
    pub pin_workers: bool,
}

impl ScanConfig {
    pub fn new(threshold_seconds: f64) -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            threshold_seconds,
            workers: Workers::Auto,
            pin_workers: false,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_workers(mut self, workers: Workers) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_pinning(mut self, pin_workers: bool) -> Self {
        self.pin_workers = pin_workers;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.batch_size == 0 {
            return Err(EngineError::InvalidConfig {
                reason: "batch size must be at least 1".to_string(),
            });
        }
        if !self.threshold_seconds.is_finite() || self.threshold_seconds <= 0.0 {
            return Err(EngineError::InvalidConfig {
                reason: format!("gap threshold must be a positive number of seconds, got {}", self.threshold_seconds),
            });
        }
        if self.workers == Workers::Fixed(0) {
            return Err(EngineError::InvalidConfig {
                reason: "worker count must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
