//! WebSocket connector
//!
//! Each connection runs in its own tokio task. Binary messages are
//! forwarded one-to-one as segments; text, ping and pong frames are
//! ignored. Closing the connection (or dropping the handle) sends a close
//! frame and reports `Closed`.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use super::connector::{
    Connection, ConnectionEvents, ConnectionState, Connector, CLOSE_ABNORMAL, CLOSE_NORMAL,
    CLOSE_NO_STATUS,
};

/// [`Connector`] backed by `tokio-tungstenite`
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Default, Clone)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for WsConnector {
    fn connect(&mut self, url: &str, events: ConnectionEvents) -> Box<dyn Connection> {
        let state = Arc::new(AtomicU8::new(ConnectionState::Connecting.as_u8()));
        let (close_tx, close_rx) = oneshot::channel();

        tracing::debug!(url = %url, generation = events.generation(), "Opening WebSocket");

        let task = tokio::spawn(run_connection(
            url.to_owned(),
            events,
            Arc::clone(&state),
            close_rx,
        ));

        Box::new(WsConnection {
            state,
            close_tx: Some(close_tx),
            _task: task,
        })
    }
}

/// Handle to a connection task
pub struct WsConnection {
    state: Arc<AtomicU8>,
    close_tx: Option<oneshot::Sender<()>>,
    _task: JoinHandle<()>,
}

impl Connection for WsConnection {
    fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn close(&mut self) {
        if let Some(tx) = self.close_tx.take() {
            if self.state().is_live() {
                self.state
                    .store(ConnectionState::Closing.as_u8(), Ordering::Release);
            }
            let _ = tx.send(());
        }
    }
}

impl Drop for WsConnection {
    fn drop(&mut self) {
        // Dropping the sender also wakes the task
        self.close();
    }
}

async fn run_connection(
    url: String,
    events: ConnectionEvents,
    state: Arc<AtomicU8>,
    mut close_rx: oneshot::Receiver<()>,
) {
    let set_state = |s: ConnectionState| state.store(s.as_u8(), Ordering::Release);

    let mut ws = tokio::select! {
        _ = &mut close_rx => {
            set_state(ConnectionState::Closed);
            events.closed(CLOSE_ABNORMAL, "closed before open");
            return;
        }
        result = tokio_tungstenite::connect_async(url.as_str()) => match result {
            Ok((ws, _response)) => ws,
            Err(e) => {
                set_state(ConnectionState::Closed);
                events.fault(e.to_string());
                events.closed(CLOSE_ABNORMAL, "");
                return;
            }
        }
    };

    set_state(ConnectionState::Open);
    events.open();

    loop {
        tokio::select! {
            _ = &mut close_rx => {
                set_state(ConnectionState::Closing);
                if let Err(e) = ws.close(None).await {
                    tracing::debug!(error = %e, "WebSocket close handshake failed");
                }
                set_state(ConnectionState::Closed);
                events.closed(CLOSE_NORMAL, "");
                return;
            }
            msg = ws.next() => match msg {
                Some(Ok(Message::Binary(data))) => events.data(data),
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame
                        .map(|f| (u16::from(f.code), f.reason.as_str().to_owned()))
                        .unwrap_or((CLOSE_NO_STATUS, String::new()));
                    set_state(ConnectionState::Closed);
                    events.closed(code, reason);
                    return;
                }
                // Only binary framing carries segments
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    set_state(ConnectionState::Closed);
                    events.fault(e.to_string());
                    events.closed(CLOSE_ABNORMAL, "");
                    return;
                }
                None => {
                    set_state(ConnectionState::Closed);
                    events.closed(CLOSE_ABNORMAL, "");
                    return;
                }
            }
        }
    }
}
