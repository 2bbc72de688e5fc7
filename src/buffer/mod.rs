//! Segment buffering and playback window management
//!
//! - [`SegmentQueue`]: bounded FIFO of pending segments
//! - [`MergePolicy`]: merge-or-single append decision
//! - [`plan_window`]: per-update buffer window maintenance
//! - [`SegmentEngine`]: ties the above to a demuxer and a playback sink

pub mod engine;
pub mod merge;
pub mod queue;
pub mod window;

pub use engine::{EngineConfig, EnginePhase, EngineSignal, SegmentEngine};
pub use merge::MergePolicy;
pub use queue::SegmentQueue;
pub use window::{plan_window, WindowConfig, WindowInput, WindowPlan};
