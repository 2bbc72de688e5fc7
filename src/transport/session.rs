//! Transport session
//!
//! Owns at most one live connection to the configured endpoint, forwards
//! its binary messages upward and drives automatic reconnection through
//! [`ReconnectState`]. All entry points run on the orchestrator's event
//! loop; the only work scheduled elsewhere is the retry timer task.

use bytes::Bytes;
use tokio::task::JoinHandle;

use crate::event::{EventSender, PlayerEvent};
use crate::logger::{log_debug, log_error, log_warn, Logger};
use crate::player::Callbacks;

use super::connector::{Connection, ConnectionEvents, Connector, TransportEvent};
use super::reconnect::{ReconnectPolicy, ReconnectState, RetryDecision};

/// Pending retry timer
struct RetryTimer {
    token: u64,
    handle: JoinHandle<()>,
}

/// One endpoint, at most one connection, bounded automatic recovery
pub struct TransportSession {
    url: String,
    connector: Box<dyn Connector>,
    connection: Option<Box<dyn Connection>>,
    /// Generation of the connection whose events are currently accepted
    generation: u64,
    state: ReconnectState,
    timer: Option<RetryTimer>,
    next_timer_token: u64,
    events: EventSender,
    callbacks: Callbacks,
    log: Logger,
}

impl TransportSession {
    pub fn new(
        url: impl Into<String>,
        connector: Box<dyn Connector>,
        policy: ReconnectPolicy,
        events: EventSender,
        callbacks: Callbacks,
        debug: bool,
    ) -> Self {
        Self {
            url: url.into(),
            connector,
            connection: None,
            generation: 0,
            state: ReconnectState::new(policy),
            timer: None,
            next_timer_token: 1,
            events,
            callbacks,
            log: Logger::new("ws-client", debug),
        }
    }

    /// Endpoint this session connects to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Retries scheduled since the last media-ready signal
    pub fn attempts(&self) -> u32 {
        self.state.attempts()
    }

    /// Whether automatic reconnection is still armed
    pub fn should_reconnect(&self) -> bool {
        self.state.should_reconnect()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.is_destroyed()
    }

    /// Generation of the current connection
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a retry timer is armed
    pub fn retry_pending(&self) -> bool {
        self.timer.is_some()
    }

    /// Whether the current connection is open or connecting
    pub fn is_connection_live(&self) -> bool {
        self.connection
            .as_ref()
            .map(|c| c.state().is_live())
            .unwrap_or(false)
    }

    /// Open the first connection
    pub fn open(&mut self) {
        if self.state.is_destroyed() {
            return;
        }
        log_debug!(self.log, url = %self.url, "connect start");
        self.open_connection();
    }

    fn open_connection(&mut self) {
        // Bumping the generation unbinds every reaction of the old connection
        self.generation += 1;
        let events = ConnectionEvents::new(self.generation, self.events.clone());
        let connection = self.connector.connect(&self.url, events);

        if let Some(mut old) = self.connection.replace(connection) {
            if old.state().is_live() {
                old.close();
            }
        }
    }

    /// Handle one connection event.
    ///
    /// Returns the chunk to forward downstream for data events.
    pub fn handle_event(&mut self, generation: u64, event: TransportEvent) -> Option<Bytes> {
        if self.state.is_destroyed() {
            log_debug!(self.log, "ws event after destroyed, ignore");
            return None;
        }
        if generation != self.generation {
            log_debug!(
                self.log,
                generation = generation,
                current = self.generation,
                "event from stale connection, ignore"
            );
            return None;
        }

        match event {
            TransportEvent::Open => {
                log_debug!(self.log, "ws open");
                self.cancel_timer();
                None
            }
            TransportEvent::Data(chunk) => Some(chunk),
            TransportEvent::Closed { code, reason } => {
                log_warn!(self.log, code = code, reason = %reason, "ws close");
                self.schedule_retry();
                None
            }
            TransportEvent::Fault(message) => {
                log_error!(self.log, error = %message, "ws error");
                None
            }
        }
    }

    fn schedule_retry(&mut self) {
        match self.state.on_close() {
            RetryDecision::Schedule { delay, attempt } => {
                let token = self.next_timer_token;
                self.next_timer_token += 1;

                log_debug!(
                    self.log,
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    "schedule reconnect"
                );

                let events = self.events.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    events.send(PlayerEvent::RetryTimer { token });
                });
                self.timer = Some(RetryTimer { token, handle });
            }
            RetryDecision::GiveUp { attempts } => {
                log_warn!(
                    self.log,
                    attempts = attempts,
                    "reach maxReconnectAttempts, stop auto reconnect"
                );
                self.abort_timer();
                self.close_connection();
                self.callbacks.reconnect_failed(&self.log, attempts);
            }
            RetryDecision::Skip(reason) => {
                log_debug!(self.log, reason = ?reason, "skip reconnect");
            }
        }
    }

    /// Retry timer elapsed
    pub fn handle_timer(&mut self, token: u64) {
        match &self.timer {
            Some(timer) if timer.token == token => {
                self.timer = None;
            }
            _ => {
                log_debug!(self.log, token = token, "stale retry timer, ignore");
                return;
            }
        }

        if self.state.on_timer_fired() {
            self.open_connection();
        } else {
            log_debug!(self.log, "skip reconnect in timer: destroyed or disabled");
        }
    }

    /// Media is flowing again; ends any reconnection in progress
    pub fn on_ready(&mut self) {
        if self.state.is_destroyed() {
            return;
        }
        self.abort_timer();
        if self.state.on_ready() {
            log_debug!(self.log, "reconnect success (media ready)");
            self.callbacks.reconnect_success(&self.log);
        }
    }

    /// Re-arm reconnection and open a fresh connection
    pub fn manual_reconnect(&mut self) {
        if self.state.is_destroyed() {
            return;
        }
        log_debug!(self.log, "manual reconnect");
        self.cancel_timer();
        self.state.rearm();
        self.close_connection();
        self.open_connection();
    }

    /// Close the live connection; its close event follows the usual
    /// reconnect rules
    pub fn close_connection(&mut self) {
        if let Some(conn) = self.connection.as_mut() {
            if conn.state().is_live() {
                conn.close();
            }
        }
    }

    /// Tear everything down. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if !self.state.destroy() {
            return;
        }
        log_debug!(self.log, "destroy");
        self.generation += 1;
        self.abort_timer();
        self.close_connection();
        self.connection = None;
    }

    fn cancel_timer(&mut self) {
        self.abort_timer();
        self.state.cancel_timer();
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
    }
}

impl Drop for TransportSession {
    fn drop(&mut self) {
        self.destroy();
    }
}
