//! Connection abstraction
//!
//! A [`Connector`] opens one physical connection per call and reports its
//! lifecycle through a [`ConnectionEvents`] handle bound to a single
//! connection generation. The session bumps the generation whenever it
//! replaces or abandons a connection, so reactions bound to an older
//! connection are unregistered without any listener bookkeeping.

use bytes::Bytes;

use crate::event::EventSender;

/// WebSocket close code for a normal closure
pub const CLOSE_NORMAL: u16 = 1000;

/// WebSocket close code when no status was present in the close frame
pub const CLOSE_NO_STATUS: u16 = 1005;

/// WebSocket close code for a connection lost without a close frame
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Lifecycle notifications emitted by a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection established
    Open,
    /// One inbound binary message
    Data(Bytes),
    /// Connection closed (by either side, or never opened)
    Closed { code: u16, reason: String },
    /// Connection level error; always followed by `Closed`
    Fault(String),
}

/// Observable state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl ConnectionState {
    /// Open or still connecting
    pub fn is_live(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Open)
    }

    pub(crate) fn from_u8(v: u8) -> Self {
        match v {
            0 => ConnectionState::Connecting,
            1 => ConnectionState::Open,
            2 => ConnectionState::Closing,
            _ => ConnectionState::Closed,
        }
    }

    pub(crate) fn as_u8(self) -> u8 {
        match self {
            ConnectionState::Connecting => 0,
            ConnectionState::Open => 1,
            ConnectionState::Closing => 2,
            ConnectionState::Closed => 3,
        }
    }
}

/// Reaction handle given to a connection, bound to one generation
#[derive(Debug, Clone)]
pub struct ConnectionEvents {
    generation: u64,
    tx: EventSender,
}

impl ConnectionEvents {
    pub fn new(generation: u64, tx: EventSender) -> Self {
        Self { generation, tx }
    }

    /// Generation this handle reports under
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn open(&self) {
        self.tx.transport(self.generation, TransportEvent::Open);
    }

    pub fn data(&self, chunk: Bytes) {
        self.tx.data(self.generation, chunk);
    }

    pub fn closed(&self, code: u16, reason: impl Into<String>) {
        self.tx.transport(
            self.generation,
            TransportEvent::Closed {
                code,
                reason: reason.into(),
            },
        );
    }

    pub fn fault(&self, message: impl Into<String>) {
        self.tx
            .transport(self.generation, TransportEvent::Fault(message.into()));
    }
}

/// Opens connections to a stream endpoint
///
/// `connect` must return immediately; the outcome is reported through
/// `events`. A connection that fails to open reports `Fault` and then
/// `Closed`.
pub trait Connector: Send {
    fn connect(&mut self, url: &str, events: ConnectionEvents) -> Box<dyn Connection>;
}

/// A single live (or formerly live) connection
pub trait Connection: Send {
    fn state(&self) -> ConnectionState;

    /// Begin closing. A `Closed` event follows unless the connection was
    /// already closed.
    fn close(&mut self);
}
