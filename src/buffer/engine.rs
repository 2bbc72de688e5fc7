//! Segment buffering engine
//!
//! Turns the bursty stream of transport chunks into a serialized sequence
//! of sink appends:
//!
//! ```text
//!   chunk ──► SegmentQueue ──flush──► PlaybackSink::append
//!               │                          │
//!      first chunk ──► Demuxer            UpdateEnd ──► window plan ──► flush
//!                        │
//!                    Demuxed ──► SinkFactory::create ──► SourceOpen ──► add_track
//! ```
//!
//! Every sink instance gets a fresh epoch. Demux replies and sink events
//! tagged with an older epoch are dropped, so a torn-down sink can never
//! drive the engine.

use bytes::Bytes;

use crate::error::{DemuxError, Error, Result, SinkError};
use crate::event::EventSender;
use crate::logger::{log_debug, log_error, log_warn, Logger};
use crate::media::{CodecDescriptor, DemuxReply, Demuxer};
use crate::player::Callbacks;
use crate::sink::{PlaybackSink, SinkEvent, SinkFactory, SinkNotifier};

use super::merge::MergePolicy;
use super::queue::SegmentQueue;
use super::window::{plan_window, WindowConfig, WindowInput, WindowPlan};

/// Sink lifecycle as seen by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// Next chunk starts codec discovery
    AwaitingFirstChunk,
    /// Waiting for the demuxer reply
    Demuxing,
    /// Sink created, waiting for `SourceOpen`
    SinkOpening,
    /// Track open, appends allowed
    SinkOpen,
    /// Sink closed or track rejected; nothing is appended until a fault resets
    SinkClosed,
}

/// What the orchestrator should do after an engine call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSignal {
    Quiet,
    /// Sink accepted the codecs; media is ready
    MediaReady,
    /// Buffering fault; the engine was reset
    Faulted,
}

/// Engine tuning
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_queue_size: usize,
    pub max_queue_bytes: usize,
    pub merge: MergePolicy,
    pub window: WindowConfig,
    /// Replaces the discovered codec list in the MIME type
    pub codec_override: Option<String>,
    /// Ask the sink factory whether the MIME type is supported (log only)
    pub type_support_check: bool,
    /// Start playback as soon as the track opens
    pub autoplay: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 50,
            max_queue_bytes: 4 * 1024 * 1024,
            merge: MergePolicy::default(),
            window: WindowConfig::default(),
            codec_override: None,
            type_support_check: false,
            autoplay: false,
        }
    }
}

pub struct SegmentEngine {
    config: EngineConfig,
    queue: SegmentQueue,
    phase: EnginePhase,
    epoch: u64,
    sink: Option<Box<dyn PlaybackSink>>,
    mime: Option<String>,
    first_frame_done: bool,
    destroyed: bool,
    sink_factory: Box<dyn SinkFactory>,
    demuxer: Box<dyn Demuxer>,
    events: EventSender,
    callbacks: Callbacks,
    log: Logger,
}

impl SegmentEngine {
    pub fn new(
        config: EngineConfig,
        sink_factory: Box<dyn SinkFactory>,
        demuxer: Box<dyn Demuxer>,
        events: EventSender,
        callbacks: Callbacks,
        debug: bool,
    ) -> Self {
        Self {
            queue: SegmentQueue::new(config.max_queue_size, config.max_queue_bytes),
            config,
            phase: EnginePhase::AwaitingFirstChunk,
            epoch: 0,
            sink: None,
            mime: None,
            first_frame_done: false,
            destroyed: false,
            sink_factory,
            demuxer,
            events,
            callbacks,
            log: Logger::new("segment-merger", debug),
        }
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Epoch of the current (or next) sink
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn queue(&self) -> &SegmentQueue {
        &self.queue
    }

    /// MIME type the current sink track was opened with
    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Queue one chunk from the transport
    pub fn handle_segment(&mut self, chunk: Bytes) -> EngineSignal {
        if self.destroyed || chunk.is_empty() {
            return EngineSignal::Quiet;
        }

        let evicted = self.queue.push(chunk.clone());
        if evicted > 0 {
            log_debug!(
                self.log,
                evicted = evicted,
                queue_size = self.queue.len(),
                queue_bytes = self.queue.total_bytes(),
                "queue over limit, dropped oldest"
            );
        }

        if self.phase == EnginePhase::AwaitingFirstChunk {
            self.phase = EnginePhase::Demuxing;
            self.epoch += 1;
            log_debug!(self.log, epoch = self.epoch, bytes = chunk.len(), "demux first segment");
            self.demuxer
                .demux(chunk, DemuxReply::new(self.epoch, self.events.clone()));
        }

        self.guard(|engine| engine.flush())
    }

    /// Codec discovery finished
    pub fn on_demuxed(
        &mut self,
        epoch: u64,
        result: std::result::Result<Vec<String>, DemuxError>,
    ) -> EngineSignal {
        if self.destroyed || epoch != self.epoch || self.phase != EnginePhase::Demuxing {
            log_debug!(self.log, epoch = epoch, current = self.epoch, "stale demux reply, ignore");
            return EngineSignal::Quiet;
        }

        let codecs = match result {
            Ok(codecs) => codecs,
            // The override names the codecs, so the demux result is not needed
            Err(e) if self.config.codec_override.is_some() => {
                log_warn!(self.log, error = %e, "codec discovery failed, using codec override");
                Vec::new()
            }
            Err(e) => return self.fault(e.into()),
        };

        self.guard(|engine| engine.create_sink(codecs))
    }

    /// Lifecycle event from the sink created under `epoch`
    pub fn on_sink_event(&mut self, epoch: u64, event: SinkEvent) -> EngineSignal {
        if self.destroyed || epoch != self.epoch || self.sink.is_none() {
            log_debug!(self.log, epoch = epoch, current = self.epoch, "stale sink event, ignore");
            return EngineSignal::Quiet;
        }

        match event {
            SinkEvent::SourceOpen => self.guard(|engine| engine.open_track()),
            SinkEvent::UpdateEnd => self.guard(|engine| {
                engine.maintain_window()?;
                engine.flush()
            }),
            SinkEvent::Error(message) => {
                log_error!(self.log, error = %message, "sink error");
                self.fault(Error::Sink(SinkError::Other(message)))
            }
            SinkEvent::SourceClosed => {
                log_warn!(self.log, "sink source closed");
                self.phase = EnginePhase::SinkClosed;
                EngineSignal::Quiet
            }
        }
    }

    /// Push queued segments into the sink if it can take them
    pub fn flush(&mut self) -> Result<EngineSignal> {
        if self.phase != EnginePhase::SinkOpen || self.queue.is_empty() {
            return Ok(EngineSignal::Quiet);
        }
        let sink = match self.sink.as_mut() {
            Some(sink) if !sink.is_updating() => sink,
            _ => return Ok(EngineSignal::Quiet),
        };

        if self.config.merge.should_merge(self.queue.len(), self.queue.total_bytes()) {
            let count = self.queue.len();
            let merged = self.queue.drain_merged();
            log_debug!(self.log, segments = count, bytes = merged.len(), "append merged");
            sink.append(merged)?;
        } else if let Some(segment) = self.queue.take_front() {
            sink.append(segment)?;
        }
        Ok(EngineSignal::Quiet)
    }

    /// Tear down the sink and drop everything queued. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        log_debug!(self.log, "destroy");
        self.reset();
    }

    fn create_sink(&mut self, codecs: Vec<String>) -> Result<EngineSignal> {
        self.teardown_sink();

        let mime = CodecDescriptor::new(codecs).mime(self.config.codec_override.as_deref());
        log_debug!(self.log, mime = %mime, "MIME codecs");

        let notifier = SinkNotifier::new(self.epoch, self.events.clone());
        let sink = self.sink_factory.create(notifier)?;
        self.sink = Some(sink);
        self.mime = Some(mime);
        self.phase = EnginePhase::SinkOpening;
        Ok(EngineSignal::Quiet)
    }

    fn open_track(&mut self) -> Result<EngineSignal> {
        if self.phase != EnginePhase::SinkOpening {
            log_debug!(self.log, phase = ?self.phase, "source open in unexpected phase, ignore");
            return Ok(EngineSignal::Quiet);
        }
        let (sink, mime) = match (self.sink.as_mut(), self.mime.as_deref()) {
            (Some(sink), Some(mime)) => (sink, mime),
            _ => return Ok(EngineSignal::Quiet),
        };

        if self.config.type_support_check && !self.sink_factory.is_type_supported(mime) {
            log_warn!(self.log, mime = %mime, "MIME type not supported by sink");
        }

        if let Err(e) = sink.add_track(mime) {
            // Sink stays unusable until the next fault resets the engine
            log_error!(self.log, error = %e, mime = %mime, "failed to open sink track");
            self.phase = EnginePhase::SinkClosed;
            return Ok(EngineSignal::Quiet);
        }
        self.phase = EnginePhase::SinkOpen;

        self.callbacks.source_buffer_ready(&self.log);

        if self.config.autoplay && sink.is_paused() {
            if let Err(e) = sink.play() {
                log_debug!(self.log, error = %e, "autoplay rejected");
            }
        }

        self.flush()?;
        Ok(EngineSignal::MediaReady)
    }

    fn maintain_window(&mut self) -> Result<()> {
        let sink = match self.sink.as_mut() {
            Some(sink) => sink,
            None => return Ok(()),
        };

        let ranges = sink.buffered();
        let input = WindowInput {
            ranges: &ranges,
            position: sink.position(),
            paused: sink.is_paused(),
            first_frame_done: self.first_frame_done,
            queue_size: self.queue.len(),
            queue_bytes: self.queue.total_bytes(),
        };
        let plan = match plan_window(&input, &self.config.window) {
            Some(plan) => plan,
            None => return Ok(()),
        };

        apply_plan(&mut **sink, &plan, &self.log)?;
        if plan.first_frame_seek.is_some() {
            self.first_frame_done = true;
        }

        self.callbacks.stats(&self.log, &plan.stats);
        Ok(())
    }

    /// Run `op`, routing any error into the fault path
    fn guard(&mut self, op: impl FnOnce(&mut Self) -> Result<EngineSignal>) -> EngineSignal {
        match op(self) {
            Ok(signal) => signal,
            Err(e) => self.fault(e),
        }
    }

    fn fault(&mut self, error: Error) -> EngineSignal {
        log_error!(self.log, error = %error, "buffering fault, resetting sink");
        self.reset();
        self.callbacks.merger_error(&self.log, &error);
        EngineSignal::Faulted
    }

    fn reset(&mut self) {
        self.teardown_sink();
        self.queue.clear();
        self.phase = EnginePhase::AwaitingFirstChunk;
        self.first_frame_done = false;
    }

    fn teardown_sink(&mut self) {
        // Invalidates the old sink's notifier and any demux reply in flight
        self.epoch += 1;
        self.mime = None;
        if let Some(mut sink) = self.sink.take() {
            sink.close();
        }
    }
}

fn apply_plan(sink: &mut dyn PlaybackSink, plan: &WindowPlan, log: &Logger) -> Result<()> {
    if let Some(target) = plan.first_frame_seek {
        log_debug!(log, target = target, "first frame, seek near live edge");
        sink.seek(target);
        if plan.start_playback {
            if let Err(e) = sink.play() {
                log_debug!(log, error = %e, "play rejected");
            }
        }
    }

    if let Some(start) = plan.snap_to {
        log_debug!(log, position = start, "play head outside buffer, snap to start");
        sink.seek(start);
    }

    for range in &plan.removals {
        // One outstanding operation at a time; the rest waits for the next update
        if sink.is_updating() {
            break;
        }
        log_debug!(log, start = range.start, end = range.end, "remove buffered range");
        sink.remove(*range)?;
    }
    Ok(())
}
