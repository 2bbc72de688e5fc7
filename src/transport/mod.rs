//! Byte-stream transport with automatic recovery
//!
//! - [`Connector`] / [`Connection`]: the socket boundary, one event stream
//!   per connection generation
//! - [`WsConnector`]: default WebSocket implementation
//! - [`ReconnectState`]: pure backoff state machine
//! - [`TransportSession`]: one endpoint, one live connection, retry timer

pub mod connector;
pub mod reconnect;
pub mod session;
pub mod ws;

pub use connector::{
    Connection, ConnectionEvents, ConnectionState, Connector, TransportEvent, CLOSE_ABNORMAL,
    CLOSE_NORMAL, CLOSE_NO_STATUS,
};
pub use reconnect::{ReconnectPolicy, ReconnectState, RetryDecision, SkipReason};
pub use session::TransportSession;
pub use ws::{WsConnection, WsConnector};
