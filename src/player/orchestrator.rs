//! Event loop core
//!
//! Owns the transport session and the buffering engine and routes every
//! queued event to one of them. Runs entirely on the player task; nothing
//! here is shared.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::buffer::{EngineSignal, SegmentEngine};
use crate::event::{EventSender, PlayerEvent};
use crate::logger::{log_debug, Logger};
use crate::transport::TransportSession;

use super::config::PlayerConfig;
use super::handle::PlayerBackend;

pub struct Orchestrator {
    session: TransportSession,
    engine: SegmentEngine,
    destroyed: Arc<AtomicBool>,
    shut_down: bool,
    log: Logger,
}

impl Orchestrator {
    pub fn new(
        config: &PlayerConfig,
        backend: PlayerBackend,
        events: EventSender,
        destroyed: Arc<AtomicBool>,
    ) -> Self {
        let PlayerBackend {
            connector,
            sink_factory,
            demuxer,
        } = backend;

        let session = TransportSession::new(
            config.url.clone(),
            connector,
            config.reconnect_policy(),
            events.clone(),
            config.callbacks.clone(),
            config.debug,
        );
        let engine = SegmentEngine::new(
            config.engine_config(),
            sink_factory,
            demuxer,
            events,
            config.callbacks.clone(),
            config.debug,
        );

        Self {
            session,
            engine,
            destroyed,
            shut_down: false,
            log: Logger::new("player", config.debug),
        }
    }

    pub fn session(&self) -> &TransportSession {
        &self.session
    }

    pub fn engine(&self) -> &SegmentEngine {
        &self.engine
    }

    /// Open the first connection
    pub fn start(&mut self) {
        if self.destroyed.load(Ordering::SeqCst) {
            return;
        }
        self.session.open();
    }

    /// Handle one event. Returns `false` once the player is shut down.
    pub fn dispatch(&mut self, event: PlayerEvent) -> bool {
        if self.shut_down {
            return false;
        }
        if self.destroyed.load(Ordering::SeqCst) || matches!(event, PlayerEvent::Destroy) {
            self.shutdown();
            return false;
        }

        match event {
            PlayerEvent::Transport { generation, event } => {
                if let Some(chunk) = self.session.handle_event(generation, event) {
                    let signal = self.engine.handle_segment(chunk);
                    self.react(signal);
                }
            }
            PlayerEvent::RetryTimer { token } => self.session.handle_timer(token),
            PlayerEvent::Demuxed { epoch, result } => {
                let signal = self.engine.on_demuxed(epoch, result);
                self.react(signal);
            }
            PlayerEvent::Sink { epoch, event } => {
                let signal = self.engine.on_sink_event(epoch, event);
                self.react(signal);
            }
            PlayerEvent::ManualReconnect => self.session.manual_reconnect(),
            PlayerEvent::Destroy => {}
        }
        true
    }

    fn react(&mut self, signal: EngineSignal) {
        match signal {
            EngineSignal::Quiet => {}
            EngineSignal::MediaReady => self.session.on_ready(),
            EngineSignal::Faulted => {
                // A fresh connection restarts the stream from its init segment
                log_debug!(self.log, "buffering fault, cycling connection");
                self.session.close_connection();
            }
        }
    }

    /// Tear down transport and engine. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        log_debug!(self.log, "shutdown");
        self.session.destroy();
        self.engine.destroy();
    }
}
