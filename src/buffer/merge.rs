//! Merge-or-single append decision

/// When a flush concatenates the whole queue into one append
///
/// Merging only ever happens with more than one queued segment. Without
/// configuration the count rule is "more than one queued" and the byte
/// rule never fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergePolicy {
    /// Merge once at least this many segments are queued
    pub threshold_count: Option<usize>,
    /// Merge once at least this many bytes are queued
    pub threshold_bytes: Option<usize>,
}

impl MergePolicy {
    pub fn new(threshold_count: Option<usize>, threshold_bytes: Option<usize>) -> Self {
        Self {
            threshold_count,
            threshold_bytes,
        }
    }

    pub fn should_merge(&self, queue_len: usize, queue_bytes: usize) -> bool {
        if queue_len <= 1 {
            return false;
        }
        let by_count = match self.threshold_count {
            Some(threshold) => queue_len >= threshold,
            None => true,
        };
        let by_bytes = match self.threshold_bytes {
            Some(threshold) => queue_bytes >= threshold,
            None => false,
        };
        by_count || by_bytes
    }
}
