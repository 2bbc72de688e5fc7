//! Playback sink boundary
//!
//! The sink is the consumer that turns appended fMP4 bytes into playable
//! media: a browser `MediaSource`/`SourceBuffer` pair, a native decoder
//! pipeline, or a test double. The engine only ever talks to it through
//! [`PlaybackSink`]; the sink reports its own lifecycle back through the
//! [`SinkNotifier`] it was created with.
//!
//! ```text
//!   SinkFactory::create(notifier) ──► PlaybackSink
//!                                          │
//!        SourceOpen ◄──────────────────────┤  (sink ready for a track)
//!        UpdateEnd  ◄──────────────────────┤  (after every append/remove)
//!        Error      ◄──────────────────────┤
//!        SourceClosed ◄────────────────────┘
//! ```

use bytes::Bytes;

use crate::error::SinkError;
use crate::event::{EventSender, PlayerEvent};

/// A buffered time range in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Lifecycle notification from a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    /// Sink is open and accepts a track
    SourceOpen,
    /// An append or removal finished
    UpdateEnd,
    /// Sink-side failure (decode error, quota, ...)
    Error(String),
    /// Sink closed underneath us
    SourceClosed,
}

/// Reporting handle bound to one sink instance
#[derive(Debug, Clone)]
pub struct SinkNotifier {
    epoch: u64,
    tx: EventSender,
}

impl SinkNotifier {
    pub fn new(epoch: u64, tx: EventSender) -> Self {
        Self { epoch, tx }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn notify(&self, event: SinkEvent) {
        self.tx.send(PlayerEvent::Sink {
            epoch: self.epoch,
            event,
        });
    }

    pub fn source_open(&self) {
        self.notify(SinkEvent::SourceOpen);
    }

    pub fn update_end(&self) {
        self.notify(SinkEvent::UpdateEnd);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(SinkEvent::Error(message.into()));
    }

    pub fn source_closed(&self) {
        self.notify(SinkEvent::SourceClosed);
    }
}

/// Media sink accepting fMP4 appends
///
/// Appends and removals are asynchronous: the sink reports
/// `is_updating() == true` until it posts `UpdateEnd`. The engine never
/// issues a second operation while one is outstanding.
pub trait PlaybackSink: Send {
    /// Open the single track described by `mime`
    /// (`video/mp4; codecs="avc1.64001f, mp4a.40.2"`)
    fn add_track(&mut self, mime: &str) -> Result<(), SinkError>;

    /// Whether an append or removal is outstanding
    fn is_updating(&self) -> bool;

    fn append(&mut self, data: Bytes) -> Result<(), SinkError>;

    fn remove(&mut self, range: TimeRange) -> Result<(), SinkError>;

    /// Buffered ranges in ascending order
    fn buffered(&self) -> Vec<TimeRange>;

    /// Current playback position in seconds
    fn position(&self) -> f64;

    fn seek(&mut self, position: f64);

    fn is_paused(&self) -> bool;

    fn play(&mut self) -> Result<(), SinkError>;

    /// End the stream and release resources. Called at most once per sink.
    fn close(&mut self);
}

/// Creates sinks for each new codec configuration
pub trait SinkFactory: Send {
    /// Create a sink. It must post `SourceOpen` through `notifier` once it
    /// is ready for [`PlaybackSink::add_track`].
    fn create(&mut self, notifier: SinkNotifier) -> Result<Box<dyn PlaybackSink>, SinkError>;

    /// Diagnostic support check; never changes behaviour
    fn is_type_supported(&self, _mime: &str) -> bool {
        true
    }
}
