//! Playback buffer window planning
//!
//! Runs after every completed sink update. The sink is the only source of
//! truth for buffered time; nothing here keeps state between calls. The
//! planner reads the buffered ranges and play head and returns what the
//! engine should do:
//!
//! 1. First frame: jump close to the live edge and start playback
//! 2. Play head outside the live range: snap back to its start
//! 3. Older fragmented ranges: remove
//! 4. Back buffer too long: remove everything up to a little behind the play head
//! 5. Total buffer too long: remove the overflow from the front
//! 6. Report [`BufferStats`]

use crate::sink::TimeRange;
use crate::stats::BufferStats;

/// Distance kept from the live edge on the first-frame jump
pub const LIVE_EDGE_MARGIN: f64 = 0.3;

/// Seconds kept behind the play head by back-buffer trimming
pub const BACK_BUFFER_KEEP: f64 = 3.0;

/// Window limits, all in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowConfig {
    /// Desired distance from the live edge after the first frame (0 = no jump)
    pub target_latency: f64,
    /// Ceiling on the live range's duration
    pub max_buffer: f64,
    /// Ceiling on buffered time behind the play head
    pub back_buffer: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            target_latency: 2.0,
            max_buffer: 20.0,
            back_buffer: 10.0,
        }
    }
}

/// Sink state observed after an update
#[derive(Debug, Clone)]
pub struct WindowInput<'a> {
    /// Buffered ranges, ascending
    pub ranges: &'a [TimeRange],
    pub position: f64,
    pub paused: bool,
    /// Whether the first-frame jump already happened for this sink
    pub first_frame_done: bool,
    pub queue_size: usize,
    pub queue_bytes: usize,
}

/// Actions derived from one update
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPlan {
    /// First-frame jump target
    pub first_frame_seek: Option<f64>,
    /// Start playback as part of the first-frame jump
    pub start_playback: bool,
    /// Play head was outside the live range
    pub snap_to: Option<f64>,
    /// Removals in issue order
    pub removals: Vec<TimeRange>,
    pub stats: BufferStats,
}

impl WindowPlan {
    /// Play head after the plan's seeks are applied
    pub fn effective_position(&self, observed: f64) -> f64 {
        self.snap_to.or(self.first_frame_seek).unwrap_or(observed)
    }
}

/// First-frame jump target inside `range`
pub fn first_frame_target(range: TimeRange, target_latency: f64) -> f64 {
    let desired = target_latency.max(0.0);
    if desired > 0.0 {
        range
            .start
            .max((range.end - LIVE_EDGE_MARGIN).min(range.end - desired))
    } else {
        range.start
    }
}

/// Plan window maintenance. `None` when nothing is buffered.
pub fn plan_window(input: &WindowInput<'_>, config: &WindowConfig) -> Option<WindowPlan> {
    let (&live, older) = input.ranges.split_last()?;
    let mut position = input.position;

    let mut first_frame_seek = None;
    let mut start_playback = false;
    if !input.first_frame_done {
        let target = first_frame_target(live, config.target_latency);
        first_frame_seek = Some(target);
        start_playback = input.paused;
        position = target;
    }

    // Out of range on either side goes back to the start of the live range
    let mut snap_to = None;
    if position < live.start || position > live.end {
        snap_to = Some(live.start);
        position = live.start;
    }

    let mut removals: Vec<TimeRange> = Vec::with_capacity(older.len() + 2);
    for range in older {
        push_removal(&mut removals, range.start, range.end);
    }

    if position - live.start > config.back_buffer {
        push_removal(&mut removals, 0.0, (position - BACK_BUFFER_KEEP).max(0.0));
    }

    let total = live.duration();
    if total > config.max_buffer {
        let overflow = total - config.max_buffer;
        push_removal(&mut removals, live.start, live.start + overflow);
    }

    Some(WindowPlan {
        first_frame_seek,
        start_playback,
        snap_to,
        removals,
        stats: BufferStats::new(live, position, input.queue_size, input.queue_bytes),
    })
}

// Sinks reject `remove(start, end)` unless end > start
fn push_removal(removals: &mut Vec<TimeRange>, start: f64, end: f64) {
    if end > start {
        removals.push(TimeRange::new(start, end));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(ranges: &[TimeRange], position: f64) -> WindowInput<'_> {
        WindowInput {
            ranges,
            position,
            paused: false,
            first_frame_done: true,
            queue_size: 0,
            queue_bytes: 0,
        }
    }

    fn config(max_buffer: f64, back_buffer: f64) -> WindowConfig {
        WindowConfig {
            target_latency: 2.0,
            max_buffer,
            back_buffer,
        }
    }

    #[test]
    fn test_empty_ranges() {
        assert!(plan_window(&input(&[], 0.0), &WindowConfig::default()).is_none());
    }

    #[test]
    fn test_first_frame_target() {
        let range = TimeRange::new(0.0, 5.0);
        assert_eq!(first_frame_target(range, 2.0), 3.0);
        // Latency below the margin still keeps the margin
        assert!((first_frame_target(range, 0.1) - 4.7).abs() < 1e-9);
        // Short range clamps to start
        assert_eq!(first_frame_target(TimeRange::new(4.0, 5.0), 2.0), 4.0);
        assert_eq!(first_frame_target(range, 0.0), 0.0);
        assert_eq!(first_frame_target(range, -1.0), 0.0);
    }

    #[test]
    fn test_first_frame_seek_and_play() {
        let ranges = [TimeRange::new(0.0, 5.0)];
        let mut inp = input(&ranges, 0.0);
        inp.first_frame_done = false;
        inp.paused = true;

        let plan = plan_window(&inp, &WindowConfig::default()).unwrap();
        assert_eq!(plan.first_frame_seek, Some(3.0));
        assert!(plan.start_playback);
        assert_eq!(plan.snap_to, None);
        assert!(plan.removals.is_empty());
        assert_eq!(plan.stats.live_latency, 2.0);
        assert_eq!(plan.effective_position(0.0), 3.0);
    }

    #[test]
    fn test_first_frame_not_repeated() {
        let ranges = [TimeRange::new(0.0, 5.0)];
        let mut inp = input(&ranges, 1.0);
        inp.paused = true;

        let plan = plan_window(&inp, &WindowConfig::default()).unwrap();
        assert_eq!(plan.first_frame_seek, None);
        assert!(!plan.start_playback);
    }

    #[test]
    fn test_snap_below_start() {
        let ranges = [TimeRange::new(10.0, 15.0)];
        let plan = plan_window(&input(&ranges, 4.0), &WindowConfig::default()).unwrap();
        assert_eq!(plan.snap_to, Some(10.0));
        assert_eq!(plan.stats.live_latency, 5.0);
    }

    #[test]
    fn test_snap_past_end_goes_to_start() {
        let ranges = [TimeRange::new(10.0, 15.0)];
        let plan = plan_window(&input(&ranges, 16.0), &WindowConfig::default()).unwrap();
        assert_eq!(plan.snap_to, Some(10.0));
    }

    #[test]
    fn test_in_range_no_snap() {
        let ranges = [TimeRange::new(10.0, 15.0)];
        let plan = plan_window(&input(&ranges, 15.0), &WindowConfig::default()).unwrap();
        assert_eq!(plan.snap_to, None);
        assert_eq!(plan.effective_position(15.0), 15.0);
    }

    #[test]
    fn test_fragments_removed_except_last() {
        let ranges = [
            TimeRange::new(0.0, 1.0),
            TimeRange::new(2.0, 3.0),
            TimeRange::new(4.0, 6.0),
        ];
        let plan = plan_window(&input(&ranges, 5.0), &WindowConfig::default()).unwrap();
        assert_eq!(
            plan.removals,
            vec![TimeRange::new(0.0, 1.0), TimeRange::new(2.0, 3.0)]
        );
        assert_eq!(plan.stats.buffered_duration, 2.0);
    }

    #[test]
    fn test_back_buffer_trim() {
        let ranges = [TimeRange::new(10.0, 30.0)];
        let plan = plan_window(&input(&ranges, 25.0), &config(60.0, 10.0)).unwrap();
        assert_eq!(plan.removals, vec![TimeRange::new(0.0, 22.0)]);
    }

    #[test]
    fn test_back_buffer_at_limit_kept() {
        let ranges = [TimeRange::new(10.0, 30.0)];
        let plan = plan_window(&input(&ranges, 20.0), &config(60.0, 10.0)).unwrap();
        assert!(plan.removals.is_empty());
    }

    #[test]
    fn test_max_buffer_trim() {
        // 90s buffered, 60s allowed: drop the first 30s of the range
        let ranges = [TimeRange::new(10.0, 100.0)];
        let plan = plan_window(&input(&ranges, 50.0), &config(60.0, 1000.0)).unwrap();
        assert_eq!(plan.removals, vec![TimeRange::new(10.0, 40.0)]);
        assert_eq!(plan.stats.live_latency, 50.0);
        assert_eq!(plan.stats.buffered_duration, 90.0);
    }

    #[test]
    fn test_back_trim_near_start_skipped() {
        // Past the back buffer, but less than the kept tail from zero
        let ranges = [TimeRange::new(0.0, 5.0)];
        let plan = plan_window(&input(&ranges, 2.5), &config(60.0, 1.0)).unwrap();
        assert!(plan.removals.is_empty());

        let plan = plan_window(&input(&ranges, 1.0), &config(60.0, 0.0)).unwrap();
        assert!(plan.removals.is_empty());
    }

    #[test]
    fn test_removals_never_empty() {
        let ranges = [
            TimeRange::new(1.0, 1.0),
            TimeRange::new(2.0, 4.0),
            TimeRange::new(4.0, 9.0),
        ];
        let plan = plan_window(&input(&ranges, 5.0), &config(60.0, 0.5)).unwrap();
        assert_eq!(
            plan.removals,
            vec![TimeRange::new(2.0, 4.0), TimeRange::new(0.0, 2.0)]
        );
        assert!(plan.removals.iter().all(|r| r.end > r.start));
    }

    #[test]
    fn test_all_steps_in_order() {
        let ranges = [TimeRange::new(0.0, 2.0), TimeRange::new(10.0, 100.0)];
        let plan = plan_window(&input(&ranges, 50.0), &config(60.0, 10.0)).unwrap();
        assert_eq!(
            plan.removals,
            vec![
                TimeRange::new(0.0, 2.0),
                TimeRange::new(0.0, 47.0),
                TimeRange::new(10.0, 40.0),
            ]
        );
    }

    #[test]
    fn test_stats_carry_queue() {
        let ranges = [TimeRange::new(0.0, 4.0)];
        let mut inp = input(&ranges, 1.0);
        inp.queue_size = 7;
        inp.queue_bytes = 700;
        let plan = plan_window(&inp, &WindowConfig::default()).unwrap();
        assert_eq!(plan.stats.queue_size, 7);
        assert_eq!(plan.stats.queue_bytes, 700);
        assert_eq!(plan.stats.live_latency, 3.0);
    }
}
