//! Player event queue
//!
//! Every asynchronous completion (socket reads, retry timers, codec
//! discovery, sink callbacks) is posted into one unbounded channel and
//! handled serially by the orchestrator. Each event carries the
//! generation, token or epoch it was issued under so that completions
//! from torn-down resources can be recognised and dropped.
//!
//! ```text
//!   connection task ──┐
//!   retry timer ──────┤                      ┌─► TransportSession
//!   demuxer ──────────┼──► EventSender ──► Orchestrator
//!   playback sink ────┘                      └─► SegmentEngine
//! ```

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::DemuxError;
use crate::sink::SinkEvent;
use crate::transport::TransportEvent;

/// Commands and completions handled by the orchestrator
#[derive(Debug)]
pub enum PlayerEvent {
    /// Event from a connection opened under `generation`
    Transport {
        generation: u64,
        event: TransportEvent,
    },
    /// Reconnect timer identified by `token` elapsed
    RetryTimer { token: u64 },
    /// Codec discovery finished for sink epoch `epoch`
    Demuxed {
        epoch: u64,
        result: Result<Vec<String>, DemuxError>,
    },
    /// Sink lifecycle notification for sink epoch `epoch`
    Sink { epoch: u64, event: SinkEvent },
    /// Caller asked for a fresh connection
    ManualReconnect,
    /// Caller asked for teardown
    Destroy,
}

/// Cloneable handle posting into the player event queue
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<PlayerEvent>,
}

impl EventSender {
    /// Create a sender and the receiving end of the queue
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PlayerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Post an event; silently dropped once the receiver is gone
    pub fn send(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    pub(crate) fn transport(&self, generation: u64, event: TransportEvent) {
        self.send(PlayerEvent::Transport { generation, event });
    }

    pub(crate) fn data(&self, generation: u64, chunk: Bytes) {
        self.transport(generation, TransportEvent::Data(chunk));
    }
}
