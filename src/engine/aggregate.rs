use std::cmp::Ordering;
use std::time::Duration;

use crate::engine::scan::BatchResult;
use crate::packet::GapRecord;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 3_600.0;
const DAY: f64 = 86_400.0;

/// Severity class of a gap by its duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationBucket {
    UnderMinute,
    MinuteToHour,
    HourToDay,
    DayOrMore,
}

impl DurationBucket {
    pub const ALL: [DurationBucket; 4] = [
        DurationBucket::UnderMinute,
        DurationBucket::MinuteToHour,
        DurationBucket::HourToDay,
        DurationBucket::DayOrMore,
    ];

    pub fn classify(duration_seconds: f64) -> Self {
        if duration_seconds < MINUTE {
            DurationBucket::UnderMinute
        } else if duration_seconds < HOUR {
            DurationBucket::MinuteToHour
        } else if duration_seconds < DAY {
            DurationBucket::HourToDay
        } else {
            DurationBucket::DayOrMore
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DurationBucket::UnderMinute => "< 1 minute",
            DurationBucket::MinuteToHour => "1 min - 1 hour",
            DurationBucket::HourToDay => "1 hour - 1 day",
            DurationBucket::DayOrMore => ">= 1 day",
        }
    }

    fn slot(&self) -> usize {
        match self {
            DurationBucket::UnderMinute => 0,
            DurationBucket::MinuteToHour => 1,
            DurationBucket::HourToDay => 2,
            DurationBucket::DayOrMore => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketCounts {
    counts: [usize; 4],
}

impl BucketCounts {
    pub fn from_gaps(gaps: &[GapRecord]) -> Self {
        let mut counts = Self::default();
        for gap in gaps {
            counts.counts[DurationBucket::classify(gap.duration_seconds).slot()] += 1;
        }
        counts
    }

    pub fn get(&self, bucket: DurationBucket) -> usize {
        self.counts[bucket.slot()]
    }

    /// Buckets in ascending severity, with their counts
    pub fn iter(&self) -> impl Iterator<Item = (DurationBucket, usize)> + '_ {
        DurationBucket::ALL.into_iter().map(move |bucket| (bucket, self.get(bucket)))
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Observational counters for the summary view
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStats {
    pub total_packets: u64,
    pub batches: usize,
    pub elapsed: Duration,
}

impl RunStats {
    pub fn packets_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_packets as f64 / secs
        } else {
            0.0
        }
    }
}

/// Every gap found in one run, with chronological and severity views
#[derive(Debug, Clone)]
pub struct GapSet {
    by_index: Vec<GapRecord>,
    by_duration: Vec<GapRecord>,
    buckets: BucketCounts,
    pub stats: RunStats,
}

impl GapSet {
    /// Merge per-batch and boundary gaps into the canonical set
    pub fn assemble(results: Vec<BatchResult>, boundary: Vec<GapRecord>, stats: RunStats) -> Self {
        let mut gaps: Vec<GapRecord> = results.into_iter().flat_map(|r| r.gaps).collect();
        gaps.extend(boundary);
        Self::from_gaps(gaps, stats)
    }

    pub fn from_gaps(mut gaps: Vec<GapRecord>, stats: RunStats) -> Self {
        gaps.sort_by_key(|g| g.start_index);

        let mut by_duration = gaps.clone();
        by_duration.sort_by(|a, b| {
            b.duration_seconds
                .partial_cmp(&a.duration_seconds)
                .unwrap_or(Ordering::Equal)
                .then(a.start_index.cmp(&b.start_index))
        });

        let buckets = BucketCounts::from_gaps(&gaps);

        Self {
            by_index: gaps,
            by_duration,
            buckets,
            stats,
        }
    }

    /// Gaps in capture order, for export
    pub fn by_index(&self) -> &[GapRecord] {
        &self.by_index
    }

    /// Gaps from longest to shortest
    pub fn by_duration(&self) -> &[GapRecord] {
        &self.by_duration
    }

    pub fn buckets(&self) -> &BucketCounts {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }
}
