//! Bounded ingestion queue
//!
//! Segments wait here between arrival from the transport and the next
//! sink append. Both bounds are enforced after every push by dropping
//! from the front, so the queue always holds the newest data.

use bytes::{BufMut, Bytes, BytesMut};
use std::collections::VecDeque;

/// FIFO of pending segments with a running byte total
#[derive(Debug)]
pub struct SegmentQueue {
    /// Maximum number of queued segments
    max_len: usize,
    /// Maximum total queued bytes
    max_bytes: usize,
    /// Current total in bytes
    total_bytes: usize,
    segments: VecDeque<Bytes>,
}

impl SegmentQueue {
    pub fn new(max_len: usize, max_bytes: usize) -> Self {
        Self {
            max_len,
            max_bytes,
            total_bytes: 0,
            segments: VecDeque::new(),
        }
    }

    /// Append a segment and evict the oldest entries until both bounds hold.
    ///
    /// Returns the number of evicted segments. A segment larger than
    /// `max_bytes` on its own is evicted immediately.
    pub fn push(&mut self, segment: Bytes) -> usize {
        self.total_bytes += segment.len();
        self.segments.push_back(segment);

        let mut evicted = 0;
        while self.segments.len() > self.max_len || self.total_bytes > self.max_bytes {
            match self.segments.pop_front() {
                Some(old) => {
                    self.total_bytes -= old.len();
                    evicted += 1;
                }
                None => break,
            }
        }
        evicted
    }

    /// Remove and return the oldest segment
    pub fn take_front(&mut self) -> Option<Bytes> {
        let segment = self.segments.pop_front()?;
        self.total_bytes -= segment.len();
        Some(segment)
    }

    /// Concatenate every queued segment in arrival order and empty the queue
    pub fn drain_merged(&mut self) -> Bytes {
        let mut merged = BytesMut::with_capacity(self.total_bytes);
        for segment in self.segments.drain(..) {
            merged.put(segment);
        }
        self.total_bytes = 0;
        merged.freeze()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.total_bytes = 0;
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total queued bytes
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}
