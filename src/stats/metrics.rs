//! Playback buffer statistics

use crate::sink::TimeRange;

/// Snapshot reported to `on_stats` after each sink update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BufferStats {
    /// Seconds between the play head and the live edge
    pub live_latency: f64,
    /// Seconds covered by the most recent buffered range
    pub buffered_duration: f64,
    /// Segments waiting in the ingestion queue
    pub queue_size: usize,
    /// Bytes waiting in the ingestion queue
    pub queue_bytes: usize,
}

impl BufferStats {
    /// Compute stats for the live range and play head
    pub fn new(range: TimeRange, position: f64, queue_size: usize, queue_bytes: usize) -> Self {
        Self {
            live_latency: range.end - position,
            buffered_duration: range.duration(),
            queue_size,
            queue_bytes,
        }
    }
}
