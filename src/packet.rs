/// Timestamp of one captured packet, as read from the capture file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketRecord {
    pub timestamp: u64,  // Raw timestamp in units of 1/resolution seconds
    pub resolution: u32, // Ticks per second (1_000_000 for usec captures)
}

impl PacketRecord {
    pub fn new(timestamp: u64, resolution: u32) -> Self {
        Self {
            timestamp,
            resolution,
        }
    }

    /// Timestamp converted to seconds since epoch
    pub fn seconds(&self) -> f64 {
        self.timestamp as f64 / self.resolution as f64
    }

    /// Whole seconds and the sub-second remainder in resolution ticks
    pub fn split(&self) -> (u64, u64) {
        let resolution = u64::from(self.resolution.max(1));
        (self.timestamp / resolution, self.timestamp % resolution)
    }
}

/// A transition between two consecutive packets that exceeded the threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapRecord {
    pub start: PacketRecord,
    pub end: PacketRecord,
    pub start_index: u64, // 1-based global index of `start`
    pub end_index: u64,   // always start_index + 1
    pub duration_seconds: f64,
}

impl GapRecord {
    /// Compare two adjacent packets and build a gap if their separation is
    /// strictly greater than `threshold_seconds`.
    ///
    /// `start_index` is the global index of `prev`.
    pub fn between(
        prev: PacketRecord,
        curr: PacketRecord,
        start_index: u64,
        threshold_seconds: f64,
    ) -> Option<Self> {
        let difference = curr.seconds() - prev.seconds();
        if difference > threshold_seconds {
            Some(Self {
                start: prev,
                end: curr,
                start_index,
                end_index: start_index + 1,
                duration_seconds: difference,
            })
        } else {
            None
        }
    }
}
