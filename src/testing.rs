//! In-memory connector, sink and demuxer for tests
//!
//! Each double is a cheap clone over shared state so a test can hand one
//! copy to the player and keep another for scripting and inspection.

use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;

use crate::error::{DemuxError, SinkError};
use crate::media::{DemuxReply, Demuxer};
use crate::sink::{PlaybackSink, SinkFactory, SinkNotifier, TimeRange};
use crate::transport::{Connection, ConnectionEvents, ConnectionState, Connector};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

struct ConnectionRecord {
    url: String,
    state: ConnectionState,
    events: ConnectionEvents,
}

#[derive(Default)]
struct ConnectorInner {
    connections: Vec<ConnectionRecord>,
    close_count: usize,
}

/// Connector whose connections only change state when told to
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    inner: Arc<Mutex<ConnectorInner>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_count(&self) -> usize {
        lock(&self.inner).connections.len()
    }

    pub fn close_count(&self) -> usize {
        lock(&self.inner).close_count
    }

    /// Set the state of the most recent connection
    pub fn set_state(&self, state: ConnectionState) {
        if let Some(last) = lock(&self.inner).connections.last_mut() {
            last.state = state;
        }
    }

    pub fn last_url(&self) -> Option<String> {
        lock(&self.inner).connections.last().map(|c| c.url.clone())
    }

    /// Event handle of the most recent connection
    pub fn events(&self) -> Option<ConnectionEvents> {
        lock(&self.inner).connections.last().map(|c| c.events.clone())
    }

    /// Mark the latest connection open and report it
    pub fn open(&self) {
        self.set_state(ConnectionState::Open);
        if let Some(events) = self.events() {
            events.open();
        }
    }

    /// Deliver a binary message on the latest connection
    pub fn data(&self, chunk: impl Into<Bytes>) {
        if let Some(events) = self.events() {
            events.data(chunk.into());
        }
    }

    /// Drop the latest connection from the remote side
    pub fn drop_remote(&self, code: u16) {
        self.set_state(ConnectionState::Closed);
        if let Some(events) = self.events() {
            events.closed(code, "remote");
        }
    }
}

impl Connector for ScriptedConnector {
    fn connect(&mut self, url: &str, events: ConnectionEvents) -> Box<dyn Connection> {
        let mut inner = lock(&self.inner);
        inner.connections.push(ConnectionRecord {
            url: url.to_string(),
            state: ConnectionState::Connecting,
            events,
        });
        let index = inner.connections.len() - 1;
        Box::new(ScriptedConnection {
            index,
            inner: Arc::clone(&self.inner),
        })
    }
}

struct ScriptedConnection {
    index: usize,
    inner: Arc<Mutex<ConnectorInner>>,
}

impl Connection for ScriptedConnection {
    fn state(&self) -> ConnectionState {
        lock(&self.inner).connections[self.index].state
    }

    fn close(&mut self) {
        let mut inner = lock(&self.inner);
        inner.close_count += 1;
        inner.connections[self.index].state = ConnectionState::Closed;
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Observable state of one scripted sink
#[derive(Default)]
pub struct SinkState {
    pub notifier: Option<SinkNotifier>,
    pub tracks: Vec<String>,
    pub appends: Vec<Bytes>,
    pub removals: Vec<TimeRange>,
    pub seeks: Vec<f64>,
    pub buffered: Vec<TimeRange>,
    pub position: f64,
    pub paused: bool,
    pub updating: bool,
    pub play_calls: u32,
    pub closed: bool,
    pub fail_add_track: bool,
    pub fail_append: bool,
    pub fail_play: bool,
    /// Stay idle after a removal instead of going busy
    pub idle_after_remove: bool,
}

/// Handle to one sink created by [`ScriptedSinkFactory`]
#[derive(Clone)]
pub struct SinkHandle {
    state: Arc<Mutex<SinkState>>,
}

impl SinkHandle {
    pub fn state(&self) -> MutexGuard<'_, SinkState> {
        lock(&self.state)
    }

    fn notifier(&self) -> Option<SinkNotifier> {
        self.state().notifier.clone()
    }

    pub fn source_open(&self) {
        if let Some(n) = self.notifier() {
            n.source_open();
        }
    }

    /// Finish the outstanding operation and report it
    pub fn update_end(&self) {
        self.state().updating = false;
        if let Some(n) = self.notifier() {
            n.update_end();
        }
    }

    pub fn error(&self, message: &str) {
        if let Some(n) = self.notifier() {
            n.error(message);
        }
    }

    pub fn source_closed(&self) {
        if let Some(n) = self.notifier() {
            n.source_closed();
        }
    }

    pub fn set_buffered(&self, ranges: &[(f64, f64)]) {
        self.state().buffered = ranges.iter().map(|&(s, e)| TimeRange::new(s, e)).collect();
    }

    pub fn set_position(&self, position: f64) {
        self.state().position = position;
    }

    pub fn appends(&self) -> Vec<Bytes> {
        self.state().appends.clone()
    }

    pub fn removals(&self) -> Vec<TimeRange> {
        self.state().removals.clone()
    }
}

struct ScriptedSink {
    state: Arc<Mutex<SinkState>>,
}

impl PlaybackSink for ScriptedSink {
    fn add_track(&mut self, mime: &str) -> Result<(), SinkError> {
        let mut s = lock(&self.state);
        if s.fail_add_track {
            return Err(SinkError::UnsupportedType(mime.to_string()));
        }
        s.tracks.push(mime.to_string());
        Ok(())
    }

    fn is_updating(&self) -> bool {
        lock(&self.state).updating
    }

    fn append(&mut self, data: Bytes) -> Result<(), SinkError> {
        let mut s = lock(&self.state);
        if s.closed {
            return Err(SinkError::Closed);
        }
        if s.updating {
            return Err(SinkError::Busy);
        }
        if s.fail_append {
            return Err(SinkError::Other("QuotaExceededError".into()));
        }
        s.appends.push(data);
        s.updating = true;
        Ok(())
    }

    fn remove(&mut self, range: TimeRange) -> Result<(), SinkError> {
        let mut s = lock(&self.state);
        if s.updating {
            return Err(SinkError::Busy);
        }
        s.removals.push(range);
        s.updating = !s.idle_after_remove;
        Ok(())
    }

    fn buffered(&self) -> Vec<TimeRange> {
        lock(&self.state).buffered.clone()
    }

    fn position(&self) -> f64 {
        lock(&self.state).position
    }

    fn seek(&mut self, position: f64) {
        let mut s = lock(&self.state);
        s.position = position;
        s.seeks.push(position);
    }

    fn is_paused(&self) -> bool {
        lock(&self.state).paused
    }

    fn play(&mut self) -> Result<(), SinkError> {
        let mut s = lock(&self.state);
        s.play_calls += 1;
        if s.fail_play {
            return Err(SinkError::Other("NotAllowedError".into()));
        }
        s.paused = false;
        Ok(())
    }

    fn close(&mut self) {
        lock(&self.state).closed = true;
    }
}

#[derive(Default)]
struct FactoryInner {
    sinks: Vec<SinkHandle>,
    fail_create: bool,
    unsupported: bool,
    type_checks: Vec<String>,
    template: SinkTemplate,
}

#[derive(Default, Clone, Copy)]
struct SinkTemplate {
    paused: bool,
    fail_add_track: bool,
    idle_after_remove: bool,
}

/// Factory producing scripted sinks
#[derive(Clone, Default)]
pub struct ScriptedSinkFactory {
    inner: Arc<Mutex<FactoryInner>>,
}

impl ScriptedSinkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        lock(&self.inner).sinks.len()
    }

    /// Most recently created sink
    pub fn current(&self) -> Option<SinkHandle> {
        lock(&self.inner).sinks.last().cloned()
    }

    pub fn sink(&self, index: usize) -> Option<SinkHandle> {
        lock(&self.inner).sinks.get(index).cloned()
    }

    pub fn fail_create(&self, fail: bool) {
        lock(&self.inner).fail_create = fail;
    }

    pub fn report_unsupported(&self, unsupported: bool) {
        lock(&self.inner).unsupported = unsupported;
    }

    pub fn type_checks(&self) -> Vec<String> {
        lock(&self.inner).type_checks.clone()
    }

    /// New sinks start paused
    pub fn start_paused(&self, paused: bool) {
        lock(&self.inner).template.paused = paused;
    }

    /// New sinks reject `add_track`
    pub fn reject_tracks(&self, reject: bool) {
        lock(&self.inner).template.fail_add_track = reject;
    }

    /// New sinks stay idle after removals
    pub fn idle_after_remove(&self, idle: bool) {
        lock(&self.inner).template.idle_after_remove = idle;
    }
}

impl SinkFactory for ScriptedSinkFactory {
    fn create(&mut self, notifier: SinkNotifier) -> Result<Box<dyn PlaybackSink>, SinkError> {
        let mut inner = lock(&self.inner);
        if inner.fail_create {
            return Err(SinkError::Unavailable("scripted".into()));
        }
        let template = inner.template;
        let state = Arc::new(Mutex::new(SinkState {
            notifier: Some(notifier),
            paused: template.paused,
            fail_add_track: template.fail_add_track,
            idle_after_remove: template.idle_after_remove,
            ..Default::default()
        }));
        inner.sinks.push(SinkHandle {
            state: Arc::clone(&state),
        });
        Ok(Box::new(ScriptedSink { state }))
    }

    fn is_type_supported(&self, mime: &str) -> bool {
        let mut inner = lock(&self.inner);
        inner.type_checks.push(mime.to_string());
        !inner.unsupported
    }
}

// ---------------------------------------------------------------------------
// Demuxer
// ---------------------------------------------------------------------------

#[derive(Default)]
struct DemuxerInner {
    result: Option<Result<Vec<String>, DemuxError>>,
    deferred: bool,
    pending: Vec<DemuxReply>,
    inputs: Vec<Bytes>,
}

/// Demuxer answering with a fixed result
#[derive(Clone, Default)]
pub struct ScriptedDemuxer {
    inner: Arc<Mutex<DemuxerInner>>,
}

impl ScriptedDemuxer {
    /// Reply immediately with `codecs`
    pub fn with_codecs(codecs: &[&str]) -> Self {
        let demuxer = Self::default();
        lock(&demuxer.inner).result = Some(Ok(codecs.iter().map(|c| c.to_string()).collect()));
        demuxer
    }

    /// Reply immediately with an error
    pub fn failing(error: DemuxError) -> Self {
        let demuxer = Self::default();
        lock(&demuxer.inner).result = Some(Err(error));
        demuxer
    }

    /// Hold replies until [`ScriptedDemuxer::release`]
    pub fn deferred(self) -> Self {
        lock(&self.inner).deferred = true;
        self
    }

    /// Send every held reply
    pub fn release(&self) {
        let (pending, result) = {
            let mut inner = lock(&self.inner);
            (std::mem::take(&mut inner.pending), inner.result.clone())
        };
        for reply in pending {
            reply.send(result.clone().unwrap_or(Err(DemuxError::NoTracks)));
        }
    }

    pub fn inputs(&self) -> Vec<Bytes> {
        lock(&self.inner).inputs.clone()
    }
}

impl Demuxer for ScriptedDemuxer {
    fn demux(&mut self, init: Bytes, reply: DemuxReply) {
        let mut inner = lock(&self.inner);
        inner.inputs.push(init);
        if inner.deferred {
            inner.pending.push(reply);
            return;
        }
        let result = inner.result.clone().unwrap_or(Err(DemuxError::NoTracks));
        drop(inner);
        reply.send(result);
    }
}
